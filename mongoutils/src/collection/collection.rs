use crate::client::Connection;
use crate::collection::{CollectionBuilder, FindOptions};
use crate::common::{encode, from_document, to_document, with_timeout};
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use crate::schema::{Schema, SchemaShape};
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};
use mongodb::Cursor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// A collection whose documents are values of `T`.
///
/// Obtained from [`Collection::builder`]. Filters are checked against the
/// schema shape of `T` before any request is sent, and every round trip to
/// the server runs under the connection's resource timeout.
///
/// # Examples
///
/// ```rust,ignore
/// let items = Collection::<Item>::builder(connection)
///     .database("dictionary")
///     .ensure()
///     .await?;
///
/// items.insert_one(&item).await?;
/// let found = items.find(&doc! { "word": "apple" }, FindOptions::new()).await?;
/// ```
pub struct Collection<T: Schema> {
    inner: Arc<CollectionInner<T>>,
}

struct CollectionInner<T> {
    connection: Connection,
    database: String,
    name: String,
    shape: SchemaShape,
    collection: mongodb::Collection<Document>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Schema> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Schema> Collection<T> {
    /// Starts building a collection for `T` over `connection`.
    pub fn builder(connection: Connection) -> CollectionBuilder<T> {
        CollectionBuilder::new(connection)
    }

    pub(crate) fn new(
        connection: Connection,
        database: &str,
        name: &str,
        shape: SchemaShape,
        collection: mongodb::Collection<Document>,
    ) -> Self {
        Collection {
            inner: Arc::new(CollectionInner {
                connection,
                database: database.to_string(),
                name: name.to_string(),
                shape,
                collection,
                _phantom: PhantomData,
            }),
        }
    }

    /// The collection name on the server.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The database holding the collection.
    pub fn database(&self) -> &str {
        &self.inner.database
    }

    /// The connection every round trip goes through.
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// The shape filters are checked against.
    pub fn shape(&self) -> &SchemaShape {
        &self.inner.shape
    }

    /// The underlying driver collection.
    pub fn inner(&self) -> &mongodb::Collection<Document> {
        &self.inner.collection
    }

    /// Inserts one document. A zero or null `_id` is dropped so the server
    /// assigns one.
    pub async fn insert_one(&self, document: &T) -> MongoUtilsResult<InsertOneResult> {
        log::debug!("insert_one on {}", self.namespace());
        let document = self.payload("insert_one", document)?;
        with_timeout(self.timeout(), self.inner.collection.insert_one(document))
            .await
            .map_err(|e| MongoUtilsError::wrap("insert_one error", e))
    }

    /// Inserts a batch of documents.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidConfiguration`] for an empty batch.
    pub async fn insert_many(&self, documents: &[T]) -> MongoUtilsResult<InsertManyResult> {
        log::debug!("insert_many of {} on {}", documents.len(), self.namespace());
        if documents.is_empty() {
            log::error!("insert_many called with no documents");
            return Err(MongoUtilsError::new(
                "insert_many requires at least one document",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let documents = documents
            .iter()
            .map(|document| self.payload("insert_many", document))
            .collect::<MongoUtilsResult<Vec<Document>>>()?;

        with_timeout(self.timeout(), self.inner.collection.insert_many(documents))
            .await
            .map_err(|e| MongoUtilsError::wrap("insert_many error", e))
    }

    /// Finds every document matching `filter`.
    ///
    /// Sort fields of `options` must belong to the schema as well.
    pub async fn find<F>(&self, filter: &F, options: FindOptions) -> MongoUtilsResult<Vec<T>>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("find on {}", self.namespace());
        let filter = self.checked("find", filter)?;
        self.verify_sort_fields(&options)?;

        let cursor = with_timeout(
            self.timeout(),
            self.inner
                .collection
                .find(filter)
                .with_options(options.to_driver_options()),
        )
        .await
        .map_err(|e| MongoUtilsError::wrap("find error", e))?;

        self.drain("find", cursor).await
    }

    /// Finds the first document matching `filter`.
    pub async fn find_one<F>(&self, filter: &F) -> MongoUtilsResult<Option<T>>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("find_one on {}", self.namespace());
        let filter = self.checked("find_one", filter)?;

        let found = with_timeout(self.timeout(), self.inner.collection.find_one(filter))
            .await
            .map_err(|e| MongoUtilsError::wrap("find_one error", e))?;

        match found {
            Some(document) => from_document(document)
                .map(Some)
                .map_err(|e| MongoUtilsError::wrap("find_one: decode error", e)),
            None => Ok(None),
        }
    }

    pub async fn count_documents<F>(&self, filter: &F) -> MongoUtilsResult<u64>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("count_documents on {}", self.namespace());
        let filter = self.checked("count_documents", filter)?;
        with_timeout(self.timeout(), self.inner.collection.count_documents(filter))
            .await
            .map_err(|e| MongoUtilsError::wrap("count_documents error", e))
    }

    /// Applies `update` to every document matching `filter`.
    ///
    /// Neither argument is checked against the schema: update documents are
    /// made of operators (`$set`, `$inc`, ...), not fields.
    pub async fn update_many<F, U>(&self, filter: &F, update: &U) -> MongoUtilsResult<UpdateResult>
    where
        F: Serialize + ?Sized,
        U: Serialize + ?Sized,
    {
        log::debug!("update_many on {}", self.namespace());
        let (filter, update) = self.update_documents("update_many", filter, update)?;
        with_timeout(
            self.timeout(),
            self.inner.collection.update_many(filter, update),
        )
        .await
        .map_err(|e| MongoUtilsError::wrap("update_many error", e))
    }

    /// Applies `update` to the first document matching `filter`.
    pub async fn update_one<F, U>(&self, filter: &F, update: &U) -> MongoUtilsResult<UpdateResult>
    where
        F: Serialize + ?Sized,
        U: Serialize + ?Sized,
    {
        log::debug!("update_one on {}", self.namespace());
        let (filter, update) = self.update_documents("update_one", filter, update)?;
        with_timeout(
            self.timeout(),
            self.inner.collection.update_one(filter, update),
        )
        .await
        .map_err(|e| MongoUtilsError::wrap("update_one error", e))
    }

    /// Deletes every document matching `filter`. An empty filter matches the
    /// whole collection.
    pub async fn delete_many<F>(&self, filter: &F) -> MongoUtilsResult<DeleteResult>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("delete_many on {}", self.namespace());
        let filter = self.checked("delete_many", filter)?;
        with_timeout(self.timeout(), self.inner.collection.delete_many(filter))
            .await
            .map_err(|e| MongoUtilsError::wrap("delete_many error", e))
    }

    pub async fn delete_one<F>(&self, filter: &F) -> MongoUtilsResult<DeleteResult>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("delete_one on {}", self.namespace());
        let filter = self.checked("delete_one", filter)?;
        with_timeout(self.timeout(), self.inner.collection.delete_one(filter))
            .await
            .map_err(|e| MongoUtilsError::wrap("delete_one error", e))
    }

    /// Runs an aggregation pipeline and decodes the results into `T`.
    pub async fn aggregate<P>(&self, pipeline: P) -> MongoUtilsResult<Vec<T>>
    where
        P: IntoIterator<Item = Document>,
    {
        self.aggregate_as::<T, P>(pipeline).await
    }

    /// Runs an aggregation pipeline whose output has a different shape,
    /// such as a `$group` stage.
    pub async fn aggregate_as<R, P>(&self, pipeline: P) -> MongoUtilsResult<Vec<R>>
    where
        R: DeserializeOwned,
        P: IntoIterator<Item = Document>,
    {
        log::debug!("aggregate on {}", self.namespace());
        let cursor = with_timeout(self.timeout(), self.inner.collection.aggregate(pipeline))
            .await
            .map_err(|e| MongoUtilsError::wrap("aggregate error", e))?;

        self.drain("aggregate", cursor).await
    }

    pub async fn list_index_names(&self) -> MongoUtilsResult<Vec<String>> {
        log::debug!("list_index_names on {}", self.namespace());
        with_timeout(self.timeout(), self.inner.collection.list_index_names())
            .await
            .map_err(|e| MongoUtilsError::wrap("list_index_names error", e))
    }

    /// Drops the collection with its documents and indexes.
    pub async fn drop(&self) -> MongoUtilsResult<()> {
        log::info!("Dropping collection {}", self.namespace());
        with_timeout(self.timeout(), self.inner.collection.drop())
            .await
            .map_err(|e| MongoUtilsError::wrap("drop error", e))
    }

    fn timeout(&self) -> Duration {
        self.inner.connection.timeout()
    }

    fn namespace(&self) -> String {
        format!("{}.{}", self.inner.database, self.inner.name)
    }

    /// Encodes and verifies a filter. An empty `_id` is kept as given.
    fn checked<S>(&self, operation: &str, value: &S) -> MongoUtilsResult<Document>
    where
        S: Serialize + ?Sized,
    {
        let document = to_document(value)
            .map_err(|e| MongoUtilsError::wrap(&format!("{}: BSON convert error", operation), e))?;
        self.verify(operation, document)
    }

    /// Encodes and verifies a document to insert, dropping an empty `_id`.
    fn payload(&self, operation: &str, value: &T) -> MongoUtilsResult<Document> {
        let document = encode(value)
            .map_err(|e| MongoUtilsError::wrap(&format!("{}: BSON convert error", operation), e))?;
        self.verify(operation, document)
    }

    fn verify(&self, operation: &str, document: Document) -> MongoUtilsResult<Document> {
        self.inner.shape.verify_document(&document).map_err(|e| {
            MongoUtilsError::wrap(&format!("{}: schema verification error", operation), e)
        })?;
        Ok(document)
    }

    fn verify_sort_fields(&self, options: &FindOptions) -> MongoUtilsResult<()> {
        for field in options.sort_fields() {
            if !self.inner.shape.has_field(field) {
                log::error!(
                    "Sort field '{}' is not part of schema '{}'",
                    field,
                    self.inner.shape.name()
                );
                return Err(MongoUtilsError::new(
                    &format!(
                        "find: sort field '{}' not found in schema '{}'",
                        field,
                        self.inner.shape.name()
                    ),
                    ErrorKind::SchemaMismatch,
                ));
            }
        }
        Ok(())
    }

    fn update_documents<F, U>(
        &self,
        operation: &str,
        filter: &F,
        update: &U,
    ) -> MongoUtilsResult<(Document, Document)>
    where
        F: Serialize + ?Sized,
        U: Serialize + ?Sized,
    {
        let filter = to_document(filter)
            .map_err(|e| MongoUtilsError::wrap(&format!("{}: BSON convert error", operation), e))?;
        let update = to_document(update)
            .map_err(|e| MongoUtilsError::wrap(&format!("{}: BSON convert error", operation), e))?;
        Ok((filter, update))
    }

    async fn drain<R>(&self, operation: &str, mut cursor: Cursor<Document>) -> MongoUtilsResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let decode = async {
            let mut results = Vec::new();
            while let Some(document) = cursor.try_next().await.map_err(|e| {
                MongoUtilsError::wrap(&format!("{}: cursor error", operation), e.into())
            })? {
                let result = from_document::<R>(document).map_err(|e| {
                    MongoUtilsError::wrap(&format!("{}: cursor decode error", operation), e)
                })?;
                results.push(result);
            }
            Ok::<Vec<R>, MongoUtilsError>(results)
        };

        let results = with_timeout(self.timeout(), decode).await?;
        log::debug!("{} returned {} documents", operation, results.len());
        Ok(results)
    }
}
