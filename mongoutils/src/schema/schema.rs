use crate::index::IndexConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type whose values are stored as documents of one collection.
///
/// Usually derived with `#[derive(Schema)]` from `mongoutils_derive`, which
/// reads the serde attributes of the struct so that [`Schema::field_names`]
/// lists the keys exactly as they appear in the encoded document.
///
/// # Usage
/// ```ignore
/// #[derive(Serialize, Deserialize, Schema)]
/// #[schema(index(fields = "word", unique))]
/// pub struct Item {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub word: String,
/// }
///
/// assert_eq!(Item::field_names(), &["_id", "word"]);
/// ```
pub trait Schema: Serialize + DeserializeOwned + Send + Sync + Unpin {
    /// Name of the schema, also the default collection name.
    fn schema_name() -> &'static str;

    /// Top-level document keys, in declaration order.
    fn field_names() -> &'static [&'static str];

    /// Indexes declared on the type itself.
    ///
    /// They are created in addition to the indexes passed to the collection
    /// builder.
    fn schema_indexes() -> Vec<IndexConfig> {
        Vec::new()
    }
}
