use crate::collection::{by_word, ensure_items, Item, Mismatch};
use mongodb::bson::doc;
use mongoutils::collection::{order_by, Collection, FindOptions};
use mongoutils::common::SortOrder;
use mongoutils::errors::{ErrorKind, MongoUtilsError};
use mongoutils::index::{IndexColumnConfig, IndexConfig};
use mongoutils_int_test::test_util::run_test;

fn mismatch() -> Mismatch {
    Mismatch {
        mismatch: "yup".to_string(),
    }
}

#[tokio::test]
async fn test_invalid_index_key_fails_before_creating_collection() {
    run_test(|ctx| async move {
        let result = Collection::<Item>::builder(ctx.connection())
            .database(ctx.database())
            .index(
                IndexConfig::new()
                    .column(IndexColumnConfig::desc("invalid-column"))
                    .unique(true)
                    .name("test_index"),
            )
            .ensure()
            .await;
        let err = match result {
            Ok(_) => panic!("an unknown index key must be rejected"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), &ErrorKind::InvalidIndex);

        let names = ctx
            .client()
            .list_collection_names(ctx.database(), ctx.timeout())
            .await?;
        assert!(names.is_empty());
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_mismatched_filters_are_rejected() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        items.insert_one(&Item::new("some-word", "definition", 1)).await?;

        let err = items.find(&mismatch(), FindOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);

        let err = items.find_one(&mismatch()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);

        let err = items.count_documents(&mismatch()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);

        let err = items.delete_many(&mismatch()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);

        let err = items.delete_one(&mismatch()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);

        // nothing was deleted
        assert_eq!(items.count_documents(&doc! {}).await?, 1);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_unknown_sort_field_is_rejected() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        let err = items
            .find(&by_word("some-word"), order_by("score", SortOrder::Descending))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::SchemaMismatch);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_update_is_not_shape_checked() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        items.insert_one(&Item::new("some-word", "definition", 1)).await?;

        let result = items
            .update_many(&mismatch(), &doc! { "$set": { "hits": 2 } })
            .await?;
        assert_eq!(result.matched_count, 0);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_documents_of_another_shape_fail_to_decode() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        items
            .inner()
            .insert_one(doc! { "word": 42, "definition": "wrong type" })
            .await?;

        let err = items
            .find(&doc! {}, FindOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DecodingError);
        assert_eq!(err.message(), "find: cursor decode error");
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_empty_insert_many_is_rejected() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        let err = items.insert_many(&[]).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}
