/// Specifies the direction of a sort or an index column.
///
/// The driver expresses both as `1` (ascending) and `-1` (descending) inside
/// key documents, which is what [`SortOrder::as_i32`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Smallest to largest
    #[default]
    Ascending,
    /// Largest to smallest
    Descending,
}

impl SortOrder {
    pub fn as_i32(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}
