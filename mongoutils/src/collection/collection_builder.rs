use crate::client::Connection;
use crate::collection::Collection;
use crate::common::{with_timeout, NAMESPACE_EXISTS_CODE};
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use crate::index::{verify_index_keys, IndexConfig};
use crate::schema::{Schema, SchemaShape};
use mongodb::bson::Document;
use mongodb::Database;
use std::marker::PhantomData;

/// Builder that validates a schema with its indexes and makes sure the
/// collection exists on the server.
///
/// # Examples
///
/// ```rust,ignore
/// let items = Collection::<Item>::builder(connection)
///     .database("dictionary")
///     .name("items")
///     .index(
///         IndexConfig::new()
///             .column(IndexColumnConfig::desc("word"))
///             .unique(true)
///             .name("by_word"),
///     )
///     .ensure()
///     .await?;
/// ```
pub struct CollectionBuilder<T: Schema> {
    connection: Connection,
    database: String,
    name: Option<String>,
    indexes: Vec<IndexConfig>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Schema> CollectionBuilder<T> {
    pub(crate) fn new(connection: Connection) -> Self {
        CollectionBuilder {
            connection,
            database: String::new(),
            name: None,
            indexes: Vec::new(),
            _phantom: PhantomData,
        }
    }

    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    /// Overrides the collection name, which defaults to the schema name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn index(mut self, index: IndexConfig) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn indexes(mut self, indexes: Vec<IndexConfig>) -> Self {
        self.indexes.extend(indexes);
        self
    }

    /// Validates everything that can be checked locally and returns the
    /// schema shape with the full list of indexes to build.
    fn validate(&self) -> MongoUtilsResult<(String, SchemaShape, Vec<IndexConfig>)> {
        if self.database.trim().is_empty() {
            log::error!("Database name cannot be empty");
            return Err(MongoUtilsError::new(
                "Database name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let name = match &self.name {
            Some(name) => name.clone(),
            None => T::schema_name().to_string(),
        };
        if name.trim().is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(MongoUtilsError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let shape = SchemaShape::of::<T>()
            .map_err(|e| MongoUtilsError::wrap("schema verification error", e))?;

        let mut indexes = self.indexes.clone();
        indexes.extend(T::schema_indexes());
        verify_index_keys(&shape, &indexes)
            .map_err(|e| MongoUtilsError::wrap("index-keys validation error", e))?;

        Ok((name, shape, indexes))
    }

    /// Creates the collection if needed, then builds each index.
    ///
    /// Calling it again on an existing collection is harmless: indexes with
    /// the same definition are left as they are.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidConfiguration`] for an empty database or
    ///   collection name.
    /// - [`ErrorKind::InvalidSchema`] when the schema declares no usable
    ///   fields.
    /// - [`ErrorKind::InvalidIndex`] when an index names an unknown field.
    /// - Driver and timeout errors while talking to the server.
    pub async fn ensure(self) -> MongoUtilsResult<Collection<T>> {
        let (name, shape, indexes) = self.validate()?;
        let timeout = self.connection.timeout();
        let database = self.connection.client().database(&self.database);

        self.create_if_missing(&database, &name).await?;

        let collection = database.collection::<Document>(&name);
        for index in &indexes {
            log::debug!("Creating index {} on {}.{}", index, self.database, name);
            with_timeout(timeout, collection.create_index(index.to_index_model()))
                .await
                .map_err(|e| {
                    MongoUtilsError::wrap(&format!("Error creating index {}", index), e)
                })?;
        }

        log::info!(
            "Collection {}.{} ready with {} index(es)",
            self.database,
            name,
            indexes.len()
        );
        Ok(Collection::new(
            self.connection,
            &self.database,
            &name,
            shape,
            collection,
        ))
    }

    async fn create_if_missing(&self, database: &Database, name: &str) -> MongoUtilsResult<()> {
        let timeout = self.connection.timeout();
        let existing = with_timeout(timeout, database.list_collection_names())
            .await
            .map_err(|e| MongoUtilsError::wrap("Error listing collections", e))?;
        if existing.iter().any(|c| c == name) {
            log::debug!("Collection {}.{} already exists", self.database, name);
            return Ok(());
        }

        match tokio::time::timeout(timeout, database.create_collection(name)).await {
            Ok(Ok(())) => {
                log::info!("Created collection {}.{}", self.database, name);
                Ok(())
            }
            Ok(Err(err)) if is_namespace_exists(&err) => {
                log::debug!("Collection {}.{} was created concurrently", self.database, name);
                Ok(())
            }
            Ok(Err(err)) => Err(MongoUtilsError::wrap(
                &format!("Error creating collection '{}'", name),
                err.into(),
            )),
            Err(elapsed) => Err(MongoUtilsError::wrap(
                &format!("Error creating collection '{}'", name),
                elapsed.into(),
            )),
        }
    }
}

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        mongodb::error::ErrorKind::Command(ref command) if command.code == NAMESPACE_EXISTS_CODE
    )
}
