use crate::common::{to_document, FIELD_SEPARATOR, LOGICAL_OPERATORS, OPERATOR_PREFIX};
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use crate::schema::Schema;
use itertools::Itertools;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Runtime view of a [`Schema`]: its name and the set of top-level keys.
///
/// Filters handed to a collection are checked against the shape so that a
/// typo'd field name or a value of an unrelated type is rejected before the
/// driver silently matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaShape {
    name: String,
    fields: BTreeSet<String>,
}

impl SchemaShape {
    /// Builds and verifies the shape of `T`.
    pub fn of<T: Schema>() -> MongoUtilsResult<Self> {
        SchemaShape::new(T::schema_name(), T::field_names())
    }

    /// Builds a shape from a name and its keys.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidSchema`] if the name is empty, no keys are given,
    /// a key is empty, or a key appears twice.
    pub fn new(name: &str, field_names: &[&str]) -> MongoUtilsResult<Self> {
        if name.trim().is_empty() {
            log::error!("Schema name cannot be empty");
            return Err(MongoUtilsError::new(
                "Schema name cannot be empty",
                ErrorKind::InvalidSchema,
            ));
        }

        if field_names.is_empty() {
            log::error!("Schema '{}' declares no fields", name);
            return Err(MongoUtilsError::new(
                &format!("Schema '{}' must declare at least one field", name),
                ErrorKind::InvalidSchema,
            ));
        }

        let mut fields = BTreeSet::new();
        for field in field_names {
            if field.is_empty() {
                log::error!("Schema '{}' declares an empty field name", name);
                return Err(MongoUtilsError::new(
                    &format!("Schema '{}' declares an empty field name", name),
                    ErrorKind::InvalidSchema,
                ));
            }
            if !fields.insert(field.to_string()) {
                log::error!("Schema '{}' declares field '{}' twice", name, field);
                return Err(MongoUtilsError::new(
                    &format!("Schema '{}' declares field '{}' more than once", name, field),
                    ErrorKind::InvalidSchema,
                ));
            }
        }

        Ok(SchemaShape {
            name: name.to_string(),
            fields,
        })
    }

    /// The schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document keys, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.as_str())
    }

    /// Whether `path` addresses a field of this shape.
    ///
    /// Dotted paths (`address.city`) are resolved by their first segment only,
    /// nested shapes are not tracked.
    pub fn has_field(&self, path: &str) -> bool {
        let head = path.split(FIELD_SEPARATOR).next().unwrap_or(path);
        self.fields.contains(head)
    }

    /// Checks every key of a filter document against the shape.
    ///
    /// Operator keys (`$...`) are not fields. `$and`, `$or` and `$nor` carry
    /// nested filters and are checked recursively; any other top-level
    /// operator (`$expr`, `$text`, `$comment`, ...) is passed through.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::SchemaMismatch`] naming the first offending key.
    pub fn verify_document(&self, document: &Document) -> MongoUtilsResult<()> {
        for (key, value) in document {
            if key.starts_with(OPERATOR_PREFIX) {
                if LOGICAL_OPERATORS.contains(&key.as_str()) {
                    self.verify_logical_operands(key, value)?;
                }
                continue;
            }

            if !self.has_field(key) {
                log::error!("Field '{}' is not part of schema '{}'", key, self.name);
                return Err(MongoUtilsError::new(
                    &format!(
                        "Mismatch between provided data and schema '{}': unknown field '{}' (expected one of: {})",
                        self.name,
                        key,
                        self.fields.iter().join(", ")
                    ),
                    ErrorKind::SchemaMismatch,
                ));
            }
        }
        Ok(())
    }

    /// Encodes `value` and verifies the resulting document.
    ///
    /// The document is returned as encoded; an `_id` of `null` stays in place
    /// so that a filter never widens to match everything.
    pub fn verify<S>(&self, value: &S) -> MongoUtilsResult<Document>
    where
        S: Serialize + ?Sized,
    {
        let document = to_document(value)?;
        self.verify_document(&document)?;
        Ok(document)
    }

    fn verify_logical_operands(&self, operator: &str, value: &Bson) -> MongoUtilsResult<()> {
        let operands = match value {
            Bson::Array(operands) => operands,
            _ => {
                log::error!("Operator '{}' expects an array of filters", operator);
                return Err(MongoUtilsError::new(
                    &format!("Operator '{}' expects an array of filters", operator),
                    ErrorKind::SchemaMismatch,
                ));
            }
        };

        for operand in operands {
            match operand {
                Bson::Document(nested) => self.verify_document(nested)?,
                other => {
                    log::error!("Operator '{}' got a non-document operand {:?}", operator, other);
                    return Err(MongoUtilsError::new(
                        &format!(
                            "Operator '{}' expects filter documents, got {:?}",
                            operator,
                            other.element_type()
                        ),
                        ErrorKind::SchemaMismatch,
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Display for SchemaShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{ {} }}", self.name, self.fields.iter().join(", "))
    }
}
