use std::cmp::Ordering;

/// Direction used when ordering documents by a field.
///
/// Used by `FindOptions::sort_by` and by the min/max read operations,
/// which are expressed as a one-document sorted lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

impl SortOrder {
    /// Orients a natural ordering according to this direction.
    #[inline]
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}
