use crate::common::SortOrder;
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use crate::schema::SchemaShape;
use itertools::Itertools;
use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use std::fmt::{Display, Formatter};

/// One column of an index definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexColumnConfig {
    name: String,
    order: SortOrder,
}

impl IndexColumnConfig {
    pub fn new(name: &str, order: SortOrder) -> Self {
        IndexColumnConfig {
            name: name.to_string(),
            order,
        }
    }

    /// An ascending column.
    pub fn asc(name: &str) -> Self {
        IndexColumnConfig::new(name, SortOrder::Ascending)
    }

    /// A descending column.
    pub fn desc(name: &str) -> Self {
        IndexColumnConfig::new(name, SortOrder::Descending)
    }

    /// The field path this column indexes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column's sort order.
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Whether the column is sorted descending.
    pub fn is_desc_order(&self) -> bool {
        self.order == SortOrder::Descending
    }
}

/// Definition of an index to build when a collection is ensured.
///
/// Each index is created on its own so that uniqueness and name apply to
/// that index alone.
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::index::{IndexColumnConfig, IndexConfig};
///
/// let index = IndexConfig::new()
///     .column(IndexColumnConfig::desc("word"))
///     .column(IndexColumnConfig::asc("definition"))
///     .unique(true)
///     .name("test_index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexConfig {
    columns: Vec<IndexColumnConfig>,
    unique: bool,
    name: Option<String>,
}

impl IndexConfig {
    pub fn new() -> Self {
        IndexConfig::default()
    }

    /// Appends a column; columns keep their declaration order.
    pub fn column(mut self, column: IndexColumnConfig) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns_from(mut self, columns: Vec<IndexColumnConfig>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets the index name. An empty name lets the server derive one.
    pub fn name(mut self, name: &str) -> Self {
        self.name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        self
    }

    /// The columns in key order.
    pub fn columns(&self) -> &[IndexColumnConfig] {
        &self.columns
    }

    /// Whether the index enforces unique keys.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// The explicit index name, if one was given.
    pub fn index_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Key document in column order, `1` for ascending and `-1` for
    /// descending columns.
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        for column in &self.columns {
            keys.insert(column.name.clone(), column.order.as_i32());
        }
        keys
    }

    /// Builds the driver's index model.
    ///
    /// `unique` is always sent, `name` only when one was given.
    pub fn to_index_model(&self) -> IndexModel {
        let mut options = IndexOptions::default();
        options.unique = Some(self.unique);
        options.name = self.name.clone();

        let mut model = IndexModel::builder().keys(self.keys()).build();
        model.options = Some(options);
        model
    }
}

impl Display for IndexConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{}:{}", c.name, c.order.as_i32()))
            .join(", ");
        match &self.name {
            Some(name) => write!(f, "{} [{}] unique={}", name, columns, self.unique),
            None => write!(f, "[{}] unique={}", columns, self.unique),
        }
    }
}

/// Parses a column list such as `"word:desc, definition"`.
///
/// Each entry is `field` or `field:asc|desc` (also `1` / `-1`); entries are
/// separated by commas.
pub fn parse_columns(columns_str: &str) -> MongoUtilsResult<Vec<IndexColumnConfig>> {
    let mut columns = Vec::new();
    for entry in columns_str.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (name, order) = match entry.split_once(':') {
            Some((name, order)) => (name.trim(), order.trim()),
            None => (entry, "asc"),
        };

        if name.is_empty() {
            log::error!("Index column '{}' has no field name", entry);
            return Err(MongoUtilsError::new(
                &format!("Index column '{}' has no field name", entry),
                ErrorKind::InvalidIndex,
            ));
        }

        let order = match order.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => SortOrder::Ascending,
            "desc" | "descending" | "-1" => SortOrder::Descending,
            other => {
                log::error!("Unknown sort order '{}' for index column '{}'", other, name);
                return Err(MongoUtilsError::new(
                    &format!("Unknown sort order '{}' for index column '{}'", other, name),
                    ErrorKind::InvalidIndex,
                ));
            }
        };
        columns.push(IndexColumnConfig::new(name, order));
    }
    Ok(columns)
}

/// Ensures every index has columns and that every column names a field of
/// the schema.
pub fn verify_index_keys(shape: &SchemaShape, indexes: &[IndexConfig]) -> MongoUtilsResult<()> {
    for index in indexes {
        if index.columns.is_empty() {
            log::error!("Index {} has no columns", index);
            return Err(MongoUtilsError::new(
                &format!("Index {} must have at least one column", index),
                ErrorKind::InvalidIndex,
            ));
        }

        for column in &index.columns {
            if !shape.has_field(&column.name) {
                log::error!(
                    "Index key '{}' not found in schema '{}'",
                    column.name,
                    shape.name()
                );
                return Err(MongoUtilsError::new(
                    &format!(
                        "Index key '{}' not found in the keys of schema '{}'",
                        column.name,
                        shape.name()
                    ),
                    ErrorKind::InvalidIndex,
                ));
            }
        }
    }
    Ok(())
}
