use crate::common::DOC_ID;
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes `value` into a BSON document.
///
/// Anything that does not serialize to a document (a bare string, a number,
/// a sequence) is rejected, as the driver only accepts documents for filters,
/// updates and inserts.
pub fn to_document<S>(value: &S) -> MongoUtilsResult<Document>
where
    S: Serialize + ?Sized,
{
    match bson::to_bson(value)? {
        Bson::Document(document) => Ok(document),
        other => {
            log::error!("Expected a document from encoding, got {:?}", other.element_type());
            Err(MongoUtilsError::new(
                &format!(
                    "Value must encode to a BSON document, got {:?}",
                    other.element_type()
                ),
                ErrorKind::EncodingError,
            ))
        }
    }
}

/// Removes `_id` when it holds the zero ObjectId or `null`, so the server
/// generates one. Returns whether the field was removed.
pub fn strip_empty_id(document: &mut Document) -> bool {
    let empty = match document.get(DOC_ID) {
        Some(Bson::ObjectId(oid)) => oid.bytes() == [0u8; 12],
        Some(Bson::Null) => true,
        _ => false,
    };
    if empty {
        document.remove(DOC_ID);
    }
    empty
}

/// Encodes an insert payload and strips an empty `_id`.
///
/// Only documents to be inserted go through here. Filters and updates are
/// encoded with [`to_document`], where an `_id: null` must keep its meaning.
pub fn encode<S>(value: &S) -> MongoUtilsResult<Document>
where
    S: Serialize + ?Sized,
{
    let mut document = to_document(value)?;
    strip_empty_id(&mut document);
    Ok(document)
}

/// Decodes a document returned by the driver into `T`.
pub fn from_document<T: DeserializeOwned>(document: Document) -> MongoUtilsResult<T> {
    Ok(bson::from_document(document)?)
}
