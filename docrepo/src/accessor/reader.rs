use super::ensure_open;
use crate::collection::CollectionResolver;
use crate::common::SortOrder;
use crate::document::{Document, DocumentKey};
use crate::driver::value::{as_number, field_value};
use crate::driver::{all, field, limit_to, order_by, Filter, FindOptions};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read capability: lookups, queries, aggregates, projections and paging.
///
/// Every method takes the partition to read from; `None` and `Some("")` both
/// read the unpartitioned collection.
#[derive(Debug)]
pub struct ReadAccessor {
    resolver: CollectionResolver,
}

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<D> {
    pub items: Vec<D>,
    /// 1-based page number
    pub page_number: u64,
    pub page_size: u64,
    /// Number of documents matching the filter across all pages
    pub total_count: u64,
}

impl<D> Page<D> {
    /// Number of pages needed for `total_count`; zero when `page_size` is zero.
    pub fn total_pages(&self) -> u64 {
        match self.page_size {
            0 => 0,
            page_size => self.total_count.div_ceil(page_size),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages()
    }
}

impl ReadAccessor {
    pub fn new(resolver: CollectionResolver) -> RepositoryResult<Self> {
        ensure_open(&resolver, "read")?;
        Ok(ReadAccessor { resolver })
    }

    pub fn get_by_id<D, K>(&self, id: &K, partition: Option<&str>) -> RepositoryResult<Option<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let filter = collection.id_filter(id)?;
        collection.find_one(&filter, &FindOptions::new())
    }

    pub fn get_one<D, K>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<Option<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve::<D, K>(partition)?
            .find_one(filter, &FindOptions::new())
    }

    pub fn find<D, K>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<Vec<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.find_with_options::<D, K>(filter, &FindOptions::new(), partition)
    }

    pub fn find_with_options<D, K>(
        &self,
        filter: &Filter,
        options: &FindOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver.resolve::<D, K>(partition)?.find(filter, options)
    }

    pub fn get_all<D, K>(&self, partition: Option<&str>) -> RepositoryResult<Vec<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.find::<D, K>(&all(), partition)
    }

    /// Returns `true` if at least one document matches.
    pub fn any<D, K>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<bool>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        Ok(!collection.find_raw(filter, &limit_to(1))?.is_empty())
    }

    pub fn count<D, K>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver.resolve::<D, K>(partition)?.count(filter)
    }

    /// Returns the matching document with the greatest value in `field_name`.
    /// Documents where the field is missing or null are not considered.
    pub fn get_by_max<D, K>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.get_by_extreme::<D, K>(filter, field_name, SortOrder::Descending, partition)
    }

    /// Returns the matching document with the smallest value in `field_name`.
    /// Documents where the field is missing or null are not considered.
    pub fn get_by_min<D, K>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.get_by_extreme::<D, K>(filter, field_name, SortOrder::Ascending, partition)
    }

    /// Returns the greatest value of `field_name` among matching documents.
    pub fn get_max_value<D, K, V>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<V>>
    where
        D: Document<K>,
        K: DocumentKey,
        V: DeserializeOwned,
    {
        self.get_extreme_value::<D, K, V>(filter, field_name, SortOrder::Descending, partition)
    }

    /// Returns the smallest value of `field_name` among matching documents.
    pub fn get_min_value<D, K, V>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<V>>
    where
        D: Document<K>,
        K: DocumentKey,
        V: DeserializeOwned,
    {
        self.get_extreme_value::<D, K, V>(filter, field_name, SortOrder::Ascending, partition)
    }

    /// Sums the numeric values of `field_name` over matching documents.
    /// Non-numeric and missing values count as zero.
    pub fn sum_by<D, K>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<f64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let documents = collection.find_raw(filter, &FindOptions::new())?;
        Ok(documents
            .iter()
            .filter_map(|document| field_value(document, field_name).and_then(as_number))
            .sum())
    }

    /// Reads the first match as a projection type `P` (any deserializable
    /// shape over the stored fields, `_id` included).
    pub fn project_one<D, K, P>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<P>>
    where
        D: Document<K>,
        K: DocumentKey,
        P: DeserializeOwned,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        collection
            .find_raw(filter, &limit_to(1))?
            .into_iter()
            .next()
            .map(|raw| collection.project(raw))
            .transpose()
    }

    /// Reads every match as a projection type `P`.
    pub fn project_many<D, K, P>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<P>>
    where
        D: Document<K>,
        K: DocumentKey,
        P: DeserializeOwned,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        collection
            .find_raw(filter, &FindOptions::new())?
            .into_iter()
            .map(|raw| collection.project(raw))
            .collect()
    }

    /// Groups matching documents by the value of `field_name`, in ascending
    /// key order. Documents missing the field are grouped under `null`.
    pub fn group_by<D, K>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<(Value, Vec<D>)>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let documents =
            collection.find_raw(filter, &order_by(field_name, SortOrder::Ascending))?;

        let mut groups = Vec::new();
        for (key, members) in &documents
            .into_iter()
            .chunk_by(|raw| field_value(raw, field_name).cloned().unwrap_or(Value::Null))
        {
            let members = members
                .map(|raw| collection.from_raw(raw))
                .collect::<RepositoryResult<Vec<D>>>()?;
            groups.push((key, members));
        }
        Ok(groups)
    }

    /// Returns one page of matches sorted by `sort_field`. Pages are
    /// numbered from 1.
    pub fn get_paginated<D, K>(
        &self,
        filter: &Filter,
        sort_field: &str,
        sort_order: SortOrder,
        page_number: u64,
        page_size: u64,
        partition: Option<&str>,
    ) -> RepositoryResult<Page<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        if page_number == 0 || page_size == 0 {
            log::error!(
                "Invalid page request: page {} of size {}",
                page_number,
                page_size
            );
            return Err(RepositoryError::new(
                "Page number and page size must be greater than zero",
                ErrorKind::InvalidOperation,
            ));
        }

        let collection = self.resolver.resolve::<D, K>(partition)?;
        let total_count = collection.count(filter)?;
        let options = order_by(sort_field, sort_order)
            .skip((page_number - 1).saturating_mul(page_size))
            .limit(page_size);
        let items = collection.find(filter, &options)?;

        Ok(Page {
            items,
            page_number,
            page_size,
            total_count,
        })
    }

    fn get_by_extreme<D, K>(
        &self,
        filter: &Filter,
        field_name: &str,
        sort_order: SortOrder,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<D>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let filter = filter.clone().and(field(field_name).ne(Value::Null));
        collection.find_one(&filter, &order_by(field_name, sort_order))
    }

    fn get_extreme_value<D, K, V>(
        &self,
        filter: &Filter,
        field_name: &str,
        sort_order: SortOrder,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<V>>
    where
        D: Document<K>,
        K: DocumentKey,
        V: DeserializeOwned,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let filter = filter.clone().and(field(field_name).ne(Value::Null));
        let options = order_by(field_name, sort_order).limit(1);
        match collection.find_raw(&filter, &options)?.into_iter().next() {
            Some(raw) => match field_value(&raw, field_name) {
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::CreateAccessor;
    use crate::driver::memory::InMemoryDatabase;
    use crate::driver::Database;
    use crate::repository_config::RepositoryConfig;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sale {
        id: u64,
        region: String,
        amount: Option<i64>,
    }

    impl Document<u64> for Sale {
        fn id(&self) -> &u64 {
            &self.id
        }

        fn set_id(&mut self, id: u64) {
            self.id = id;
        }
    }

    fn sale(id: u64, region: &str, amount: Option<i64>) -> Sale {
        Sale {
            id,
            region: region.to_string(),
            amount,
        }
    }

    fn reader_with_sales() -> ReadAccessor {
        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("shop")))
            .unwrap();
        let resolver = CollectionResolver::new(config);
        let creator = CreateAccessor::new(resolver.clone()).unwrap();
        let mut sales = vec![
            sale(1, "north", Some(10)),
            sale(2, "south", Some(40)),
            sale(3, "north", Some(25)),
            sale(4, "east", None),
        ];
        creator.add_many::<Sale, u64>(&mut sales).unwrap();
        ReadAccessor::new(resolver).unwrap()
    }

    #[test]
    fn test_get_by_id_and_get_one() {
        let reader = reader_with_sales();
        let found = reader.get_by_id::<Sale, u64>(&2, None).unwrap();
        assert_eq!(found.map(|s| s.region), Some("south".to_string()));
        assert!(reader.get_by_id::<Sale, u64>(&99, None).unwrap().is_none());

        let north = reader
            .get_one::<Sale, u64>(&field("region").eq("north"), None)
            .unwrap();
        assert_eq!(north.map(|s| s.id), Some(1));
    }

    #[test]
    fn test_find_count_any() {
        let reader = reader_with_sales();
        let north = reader
            .find::<Sale, u64>(&field("region").eq("north"), None)
            .unwrap();
        assert_eq!(north.len(), 2);
        assert_eq!(reader.get_all::<Sale, u64>(None).unwrap().len(), 4);
        assert_eq!(
            reader
                .count::<Sale, u64>(&field("amount").gt(20), None)
                .unwrap(),
            2
        );
        assert!(reader.any::<Sale, u64>(&field("region").eq("east"), None).unwrap());
        assert!(!reader.any::<Sale, u64>(&field("region").eq("west"), None).unwrap());
    }

    #[test]
    fn test_find_with_options() {
        let reader = reader_with_sales();
        let options = order_by("amount", SortOrder::Descending).limit(2);
        let top = reader
            .find_with_options::<Sale, u64>(&all(), &options, None)
            .unwrap();
        assert_eq!(top.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_extremes_skip_missing_values() {
        let reader = reader_with_sales();
        let max = reader.get_by_max::<Sale, u64>(&all(), "amount", None).unwrap();
        let min = reader.get_by_min::<Sale, u64>(&all(), "amount", None).unwrap();
        assert_eq!(max.map(|s| s.id), Some(2));
        assert_eq!(min.map(|s| s.id), Some(1));

        let max_value: Option<i64> = reader
            .get_max_value::<Sale, u64, i64>(&all(), "amount", None)
            .unwrap();
        let min_value: Option<i64> = reader
            .get_min_value::<Sale, u64, i64>(&field("region").eq("north"), "amount", None)
            .unwrap();
        assert_eq!(max_value, Some(40));
        assert_eq!(min_value, Some(10));
    }

    #[test]
    fn test_sum_by() {
        let reader = reader_with_sales();
        let total = reader.sum_by::<Sale, u64>(&all(), "amount", None).unwrap();
        assert_eq!(total, 75.0);
    }

    #[test]
    fn test_projections() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct RegionOnly {
            region: String,
        }

        let reader = reader_with_sales();
        let first: Option<RegionOnly> = reader
            .project_one::<Sale, u64, RegionOnly>(&field("id").eq(3), None)
            .unwrap();
        assert_eq!(
            first,
            Some(RegionOnly {
                region: "north".to_string()
            })
        );

        let many: Vec<RegionOnly> = reader
            .project_many::<Sale, u64, RegionOnly>(&all(), None)
            .unwrap();
        assert_eq!(many.len(), 4);
    }

    #[test]
    fn test_group_by() {
        let reader = reader_with_sales();
        let groups = reader.group_by::<Sale, u64>(&all(), "region", None).unwrap();
        let summary = groups
            .iter()
            .map(|(key, members)| (key.clone(), members.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (Value::from("east"), 1),
                (Value::from("north"), 2),
                (Value::from("south"), 1)
            ]
        );
    }

    #[test]
    fn test_group_by_array_values() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Tagged {
            id: u64,
            tags: Vec<String>,
        }

        impl Document<u64> for Tagged {
            fn id(&self) -> &u64 {
                &self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }

        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("shop")))
            .unwrap();
        let resolver = CollectionResolver::new(config);
        let mut tagged = [("a", 1), ("b", 2), ("a", 3), ("b", 4)]
            .iter()
            .map(|(tag, id)| Tagged {
                id: *id,
                tags: vec![tag.to_string()],
            })
            .collect::<Vec<_>>();
        CreateAccessor::new(resolver.clone())
            .unwrap()
            .add_many::<Tagged, u64>(&mut tagged)
            .unwrap();

        let reader = ReadAccessor::new(resolver).unwrap();
        let groups = reader.group_by::<Tagged, u64>(&all(), "tags", None).unwrap();
        let summary = groups
            .iter()
            .map(|(key, members)| (key.clone(), members.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![(serde_json::json!(["a"]), 2), (serde_json::json!(["b"]), 2)]
        );
    }

    #[test]
    fn test_page_with_zero_size_has_no_pages() {
        let page: Page<Sale> = Page {
            items: Vec::new(),
            page_number: 1,
            page_size: 0,
            total_count: 4,
        };
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_get_paginated() {
        let reader = reader_with_sales();
        let page = reader
            .get_paginated::<Sale, u64>(&all(), "id", SortOrder::Ascending, 2, 3, None)
            .unwrap();
        assert_eq!(page.items.iter().map(|s| s.id).collect::<Vec<_>>(), vec![4]);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages(), 2);
        assert!(!page.has_next());

        let error = reader
            .get_paginated::<Sale, u64>(&all(), "id", SortOrder::Ascending, 0, 3, None)
            .unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_partitions_are_isolated() {
        let reader = reader_with_sales();
        assert!(reader
            .get_all::<Sale, u64>(Some("archive"))
            .unwrap()
            .is_empty());
        assert_eq!(reader.get_all::<Sale, u64>(Some("")).unwrap().len(), 4);
    }
}
