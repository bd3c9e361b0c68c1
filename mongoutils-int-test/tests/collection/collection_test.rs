use crate::collection::{by_word, ensure_items, generate_items, Item, ItemFilter};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson};
use mongoutils::collection::{limit_to, order_by, skip_by, Collection, FindOptions};
use mongoutils::common::SortOrder;
use mongoutils::errors::{MongoUtilsError, MongoUtilsResult};
use mongoutils_int_test::test_util::run_test;
use serde::Deserialize;

async fn seed(items: &Collection<Item>) -> MongoUtilsResult<()> {
    items.insert_one(&Item::new("some-word", "some-definition1", 5)).await?;
    items.insert_one(&Item::new("some-word2", "some-definition2", 8)).await?;
    items.insert_one(&Item::new("some-word", "some-definition3", 8)).await?;
    items.insert_one(&Item::new("some-word", "some-definition4", 10)).await?;
    Ok(())
}

#[tokio::test]
async fn test_find_matching_documents() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let results = items.find(&by_word("some-word"), FindOptions::new()).await?;
        assert_eq!(results.len(), 3);
        for item in &results {
            assert_eq!(item.word, "some-word");
            assert!(item.id.is_some());
        }
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_sorted_ascending() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let results = items
            .find(&by_word("some-word"), order_by("hits", SortOrder::Ascending))
            .await?;
        let hits: Vec<i32> = results.iter().map(|item| item.hits).collect();
        assert_eq!(hits, vec![5, 8, 10]);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_sorted_descending_with_limit() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let options = FindOptions::new()
            .sort_by("hits", SortOrder::Descending)
            .limit(1);
        let results = items.find(&by_word("some-word"), options).await?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hits, 10);
        assert_eq!(results[0].definition, "some-definition4");
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_with_skip_and_multi_field_sort() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let options = FindOptions::new()
            .sort_by("hits", SortOrder::Descending)
            .sort_by("word", SortOrder::Ascending)
            .skip(1);
        let results = items.find(&doc! {}, options).await?;
        let pairs: Vec<(String, i32)> = results
            .into_iter()
            .map(|item| (item.word, item.hits))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("some-word".to_string(), 8),
                ("some-word2".to_string(), 8),
                ("some-word".to_string(), 5),
            ]
        );

        let results = items.find(&doc! {}, skip_by(3)).await?;
        assert_eq!(results.len(), 1);
        let results = items.find(&doc! {}, limit_to(2)).await?;
        assert_eq!(results.len(), 2);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_with_operators() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let results = items
            .find(
                &doc! { "hits": { "$gte": 8 }, "$or": [ { "word": "some-word" }, { "word": "some-word2" } ] },
                FindOptions::new(),
            )
            .await?;
        assert_eq!(results.len(), 3);

        let results = items
            .find(&doc! { "word": { "$in": ["some-word2"] } }, FindOptions::new())
            .await?;
        assert_eq!(results.len(), 1);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_with_projection() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let options = FindOptions::new()
            .projection(doc! { "word": 1, "hits": 1 })
            .sort_by("hits", SortOrder::Ascending);
        let results = items.find(&by_word("some-word"), options).await?;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|item| item.definition.is_empty()));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_find_one_and_count() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let found = items.find_one(&by_word("some-word2")).await?;
        assert_eq!(found.map(|item| item.hits), Some(8));

        let missing = items.find_one(&by_word("no-such-word")).await?;
        assert!(missing.is_none());

        assert_eq!(items.count_documents(&by_word("some-word")).await?, 3);
        assert_eq!(items.count_documents(&doc! {}).await?, 4);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_insert_strips_empty_id() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;

        let mut item = Item::new("zero-id", "definition", 1);
        item.id = Some(ObjectId::from_bytes([0; 12]));
        let result = items.insert_one(&item).await?;
        let inserted = match result.inserted_id {
            Bson::ObjectId(oid) => oid,
            other => panic!("unexpected inserted id {:?}", other),
        };
        assert_ne!(inserted.bytes(), [0u8; 12]);

        let found = items.find_one(&by_word("zero-id")).await?;
        assert_eq!(found.and_then(|item| item.id), Some(inserted));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_insert_keeps_explicit_id() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;

        let id = ObjectId::new();
        let mut item = Item::new("explicit-id", "definition", 1);
        item.id = Some(id);
        let result = items.insert_one(&item).await?;
        assert_eq!(result.inserted_id, Bson::ObjectId(id));

        let found = items.find_one(&doc! { "_id": id }).await?;
        assert_eq!(found, Some(item));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_insert_many() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;

        let batch = generate_items(10);
        let result = items.insert_many(&batch).await?;
        assert_eq!(result.inserted_ids.len(), 10);
        assert_eq!(items.count_documents(&doc! {}).await?, 10);

        let first = &batch[0];
        let found = items.find_one(&by_word(&first.word)).await?;
        assert_eq!(found.map(|item| item.definition), Some(first.definition.clone()));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_update_many() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let result = items
            .update_many(
                &by_word("some-word"),
                &doc! { "$set": { "definition": "updated-definition" } },
            )
            .await?;
        assert_eq!(result.matched_count, 3);
        assert_eq!(result.modified_count, 3);

        let filter = ItemFilter {
            definition: Some("updated-definition".to_string()),
            ..Default::default()
        };
        assert_eq!(items.count_documents(&filter).await?, 3);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_update_one_does_not_upsert() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let result = items
            .update_one(&by_word("some-word"), &doc! { "$inc": { "hits": 1 } })
            .await?;
        assert_eq!(result.modified_count, 1);

        let result = items
            .update_one(&by_word("no-such-word"), &doc! { "$set": { "hits": 1 } })
            .await?;
        assert_eq!(result.matched_count, 0);
        assert!(result.upserted_id.is_none());
        assert_eq!(items.count_documents(&doc! {}).await?, 4);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_delete_many_and_one() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let result = items.delete_one(&by_word("some-word")).await?;
        assert_eq!(result.deleted_count, 1);

        let result = items.delete_many(&by_word("some-word")).await?;
        assert_eq!(result.deleted_count, 2);

        assert_eq!(items.count_documents(&doc! {}).await?, 1);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_delete_with_null_id_matches_nothing() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let null_id = doc! { "_id": Bson::Null };
        assert_eq!(items.count_documents(&null_id).await?, 0);

        let result = items.delete_many(&null_id).await?;
        assert_eq!(result.deleted_count, 0);
        assert_eq!(items.count_documents(&doc! {}).await?, 4);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[derive(Debug, Deserialize)]
struct HitsTotal {
    #[serde(rename = "_id")]
    word: String,
    total: i32,
}

#[tokio::test]
async fn test_aggregate() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        let matched = items
            .aggregate(vec![
                doc! { "$match": { "word": "some-word" } },
                doc! { "$sort": { "hits": -1 } },
            ])
            .await?;
        let hits: Vec<i32> = matched.iter().map(|item| item.hits).collect();
        assert_eq!(hits, vec![10, 8, 5]);

        let totals = items
            .aggregate_as::<HitsTotal, _>(vec![
                doc! { "$group": { "_id": "$word", "total": { "$sum": "$hits" } } },
                doc! { "$sort": { "_id": 1 } },
            ])
            .await?;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].word, "some-word");
        assert_eq!(totals[0].total, 23);
        assert_eq!(totals[1].total, 8);
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_drop_collection() {
    run_test(|ctx| async move {
        let items = ensure_items(ctx.connection(), ctx.database()).await?;
        seed(&items).await?;

        items.drop().await?;
        let names = ctx
            .client()
            .list_collection_names(ctx.database(), ctx.timeout())
            .await?;
        assert!(!names.contains(&items.name().to_string()));
        Ok::<(), MongoUtilsError>(())
    })
    .await
}
