use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongoutils::client::{Client, ClientConfig, Connection};
use mongoutils::collection::{Collection, FindOptions};
use mongoutils::common::SortOrder;
use mongoutils::errors::MongoUtilsResult;
use mongoutils::index::{IndexColumnConfig, IndexConfig};
use mongoutils_derive::Schema;
use serde::{Deserialize, Serialize};

/// A word definition as stored in the `test_coll` collection.
#[derive(Debug, Clone, Serialize, Deserialize, Schema)]
pub struct Item {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub word: String,
    pub definition: String,
    pub hits: i32,
}

impl Item {
    fn new(word: &str, definition: &str, hits: i32) -> Self {
        Item {
            id: None,
            word: word.to_string(),
            definition: definition.to_string(),
            hits,
        }
    }
}

fn demo_config() -> MongoUtilsResult<ClientConfig> {
    match ClientConfig::from_env("MONGO_DEMO") {
        Ok(config) => Ok(config),
        Err(_) => ClientConfig::builder()
            .host("localhost:27017")
            .username("root")
            .password("root")
            .connect_timeout_ms(1000)
            .build(),
    }
}

#[tokio::main]
async fn main() -> MongoUtilsResult<()> {
    colog::init();

    let client = Client::connect(demo_config()?).await?;
    let connection = Connection::new(client.clone(), 5000)?;

    let items = Collection::<Item>::builder(connection)
        .database("test")
        .name("test_coll")
        .index(
            IndexConfig::new()
                .column(IndexColumnConfig::desc("word"))
                .unique(true)
                .name("test_index"),
        )
        .ensure()
        .await?;

    for item in [
        Item::new("some-word", "some-definition", 5),
        Item::new("some-word2", "some-definition", 3),
        Item::new("some-word3", "some-definition", 7),
    ] {
        // a rerun hits the unique index, which is fine for a demo
        match items.insert_one(&item).await {
            Ok(result) => log::info!("Inserted {}: {:?}", item.word, result.inserted_id),
            Err(e) => log::warn!("Error inserting {}, continuing: {}", item.word, e),
        }
    }

    log::info!("=========================");
    let found = items
        .find(&doc! { "word": "some-word" }, FindOptions::new())
        .await?;
    for item in &found {
        log::info!("Find result: {} {}", item.word, item.definition);
    }

    log::info!("=========================");
    let sorted = items
        .find(
            &doc! { "definition": "some-definition" },
            FindOptions::new().sort_by("hits", SortOrder::Ascending),
        )
        .await?;
    log::info!("Find results sorted by ascending hits:");
    for item in &sorted {
        log::info!("{:?}", item);
    }

    log::info!("=========================");
    let max = items
        .find(
            &doc! { "definition": "some-definition" },
            FindOptions::new()
                .sort_by("hits", SortOrder::Descending)
                .limit(1),
        )
        .await?;
    log::info!("Item with the most hits: {:?}", max.first());

    let updated = items
        .update_many(
            &doc! { "word": "some-word" },
            &doc! { "$set": { "definition": "updated-definition" } },
        )
        .await?;
    log::info!(
        "Update result: matched {}, modified {}",
        updated.matched_count,
        updated.modified_count
    );

    let deleted = items.delete_many(&doc! { "word": "some-word" }).await?;
    log::info!("Delete result: deleted {}", deleted.deleted_count);

    client.disconnect().await
}
