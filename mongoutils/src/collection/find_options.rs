use crate::common::SortOrder;
use mongodb::bson::Document;

/// Options for controlling find operations.
///
/// Sorting, pagination and projection are forwarded to the driver as-is.
/// Sort fields are checked against the collection's schema like filter keys.
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::collection::{limit_to, order_by, FindOptions};
/// use mongoutils::common::SortOrder;
///
/// // the two highest scores
/// let options = FindOptions::new()
///     .sort_by("hits", SortOrder::Descending)
///     .limit(2);
///
/// // convenience functions
/// let options = order_by("hits", SortOrder::Ascending);
/// let options = limit_to(1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<i64>,
    pub(crate) projection: Option<Document>,
    pub(crate) batch_size: Option<u32>,
}

/// Creates `FindOptions` sorted by one field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips the first `skip` results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` returning at most `limit` results.
pub fn limit_to(limit: i64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Adds a sort field. Fields are applied in the order they are added.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Limits the number of results. A negative limit asks the server for a
    /// single batch, as the driver does.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn sort_fields(&self) -> impl Iterator<Item = &str> {
        self.sort_by.iter().map(|(field, _)| field.as_str())
    }

    /// Sort specification as a key document, `None` when unsorted.
    pub fn sort_document(&self) -> Option<Document> {
        if self.sort_by.is_empty() {
            return None;
        }

        let mut sort = Document::new();
        for (field, order) in &self.sort_by {
            sort.insert(field.clone(), order.as_i32());
        }
        Some(sort)
    }

    pub(crate) fn to_driver_options(&self) -> mongodb::options::FindOptions {
        let mut options = mongodb::options::FindOptions::default();
        options.sort = self.sort_document();
        options.skip = self.skip;
        options.limit = self.limit;
        options.projection = self.projection.clone();
        options.batch_size = self.batch_size;
        options
    }
}
