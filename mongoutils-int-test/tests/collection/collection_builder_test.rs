use crate::collection::{ensure_items, Item};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::IndexModel;
use mongoutils::collection::Collection;
use mongoutils::errors::{ErrorKind, MongoUtilsError};
use mongoutils::index::{IndexColumnConfig, IndexConfig};
use mongoutils_int_test::test_util::run_test;
use std::collections::HashMap;

async fn index_models(items: &Collection<Item>) -> Result<HashMap<String, IndexModel>, MongoUtilsError> {
    let mut cursor = items.inner().list_indexes().await?;
    let mut models = HashMap::new();
    while let Some(model) = cursor.try_next().await? {
        let name = model
            .options
            .as_ref()
            .and_then(|options| options.name.clone())
            .unwrap_or_default();
        models.insert(name, model);
    }
    Ok(models)
}

#[tokio::test]
async fn test_ensure_creates_collection() {
    run_test(|ctx| async move {
        let items = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .name("test_coll")
            .ensure()
            .await?;
        assert_eq!(items.name(), "test_coll");
        assert_eq!(items.database(), ctx.database());

        let names = ctx
            .client()
            .list_collection_names(ctx.database(), ctx.timeout())
            .await?;
        assert!(names.contains(&"test_coll".to_string()));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_ensure_uses_schema_name() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        assert_eq!(items.name(), "test_collection");
        assert_eq!(items.shape().name(), "test_collection");
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_ensure_creates_indexes() {
    run_test(|ctx| async move {
        let items = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(
                IndexConfig::new()
                    .column(IndexColumnConfig::desc("word"))
                    .column(IndexColumnConfig::asc("definition"))
                    .unique(true)
                    .name("test_index1"),
            )
            .index(
                IndexConfig::new()
                    .column(IndexColumnConfig::asc("definition"))
                    .name("test_index2"),
            )
            .ensure()
            .await?;

        let models = index_models(&items).await?;

        let first = &models["test_index1"];
        assert_eq!(first.keys, doc! { "word": -1, "definition": 1 });
        assert_eq!(
            first.options.as_ref().and_then(|options| options.unique),
            Some(true)
        );

        let second = &models["test_index2"];
        assert_eq!(second.keys, doc! { "definition": 1 });
        assert_ne!(
            second.options.as_ref().and_then(|options| options.unique),
            Some(true)
        );

        let mut names = items.list_index_names().await?;
        names.sort();
        assert_eq!(names, vec!["_id_", "test_index1", "test_index2"]);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_unnamed_index_gets_server_name() {
    run_test(|ctx| async move {
        let items = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(IndexConfig::new().column(IndexColumnConfig::desc("hits")))
            .ensure()
            .await?;

        let names = items.list_index_names().await?;
        assert!(names.contains(&"hits_-1".to_string()));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_ensure_is_idempotent() {
    run_test(|ctx| async move {
        let index = IndexConfig::new()
            .column(IndexColumnConfig::desc("word"))
            .unique(true)
            .name("test_index");

        let items = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(index.clone())
            .ensure()
            .await?;
        items.insert_one(&Item::new("kept", "definition", 1)).await?;

        let again = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(index)
            .ensure()
            .await?;
        assert_eq!(again.count_documents(&doc! {}).await?, 1);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_unique_index_rejects_duplicates() {
    run_test(|ctx| async move {
        let items = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(
                IndexConfig::new()
                    .column(IndexColumnConfig::desc("word"))
                    .unique(true),
            )
            .ensure()
            .await?;

        items.insert_one(&Item::new("same", "first", 1)).await?;
        let err = items
            .insert_one(&Item::new("same", "second", 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DriverError);
        assert_eq!(err.message(), "insert_one error");

        let count = items.count_documents(&Document::new()).await?;
        assert_eq!(count, 1);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}
