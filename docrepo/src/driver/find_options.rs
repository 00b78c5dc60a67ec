use crate::common::SortOrder;
use crate::driver::value::{sort_order, field_value, RawDocument};
use std::cmp::Ordering;

/// Sorting and pagination applied by the driver after filtering.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::common::SortOrder;
/// use docrepo::driver::{order_by, FindOptions};
///
/// let page = order_by("total", SortOrder::Descending).skip(20).limit(10);
/// let first = FindOptions::new().limit(1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates options sorted by one field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates options skipping the first `skip` matches.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates options returning at most `limit` matches.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Adds a sort key. Earlier keys take precedence over later ones.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_fields(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    /// Sorts, skips and truncates an already filtered result set.
    pub fn apply(&self, mut documents: Vec<RawDocument>) -> Vec<RawDocument> {
        if !self.sort_by.is_empty() {
            // stable sort keeps insertion order among equal keys
            documents.sort_by(|left, right| self.compare(left, right));
        }

        let skip = self.skip.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        documents.into_iter().skip(skip).take(limit).collect()
    }

    fn compare(&self, left: &RawDocument, right: &RawDocument) -> Ordering {
        for (field, order) in &self.sort_by {
            let ordering = order.apply(sort_order(
                field_value(left, field),
                field_value(right, field),
            ));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::value::into_raw_document;
    use serde_json::json;

    fn documents() -> Vec<RawDocument> {
        vec![
            into_raw_document(json!({"_id": 1, "total": 30, "status": "b"})).unwrap(),
            into_raw_document(json!({"_id": 2, "total": 10, "status": "a"})).unwrap(),
            into_raw_document(json!({"_id": 3, "total": 20, "status": "a"})).unwrap(),
        ]
    }

    fn ids(documents: &[RawDocument]) -> Vec<i64> {
        documents
            .iter()
            .map(|d| d.get("_id").unwrap().as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_default_keeps_order() {
        let result = FindOptions::new().apply(documents());
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let result = order_by("total", SortOrder::Ascending).apply(documents());
        assert_eq!(ids(&result), vec![2, 3, 1]);

        let result = order_by("total", SortOrder::Descending).apply(documents());
        assert_eq!(ids(&result), vec![1, 3, 2]);
    }

    #[test]
    fn test_secondary_sort_key() {
        let result = order_by("status", SortOrder::Ascending)
            .sort_by("total", SortOrder::Descending)
            .apply(documents());
        assert_eq!(ids(&result), vec![3, 2, 1]);
    }

    #[test]
    fn test_skip_and_limit() {
        let result = order_by("total", SortOrder::Ascending)
            .skip(1)
            .limit(1)
            .apply(documents());
        assert_eq!(ids(&result), vec![3]);

        assert!(skip_by(5).apply(documents()).is_empty());
        assert_eq!(limit_to(2).apply(documents()).len(), 2);
    }
}
