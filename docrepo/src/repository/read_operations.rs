use crate::accessor::{Page, ReadAccessor};
use crate::common::SortOrder;
use crate::document::{normalize_partition, Document, DocumentKey};
use crate::driver::{Filter, FindOptions};
use crate::errors::RepositoryResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// The read surface shared by [`KeyedRepository`](super::KeyedRepository)
/// and [`ReadOnlyRepository`](super::ReadOnlyRepository).
///
/// Implementors only supply the read accessor; every operation normalizes
/// the partition and delegates to it.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::repository::ReadOperations;
/// use docrepo::driver::field;
///
/// let open = repository.find::<Order>(&field("status").eq("open"), Some("tenantA"))?;
/// let one = repository.get_by_id::<Order>(&id, Some("tenantA"))?;
/// ```
pub trait ReadOperations<K: DocumentKey> {
    /// The shared read accessor of the underlying repository.
    fn read_accessor(&self) -> RepositoryResult<Arc<ReadAccessor>>;

    fn get_by_id<D: Document<K>>(&self, id: &K, partition: Option<&str>) -> RepositoryResult<Option<D>> {
        self.read_accessor()?
            .get_by_id::<D, K>(id, normalize_partition(partition))
    }

    fn get_one<D: Document<K>>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<Option<D>> {
        self.read_accessor()?
            .get_one::<D, K>(filter, normalize_partition(partition))
    }

    fn find<D: Document<K>>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<Vec<D>> {
        self.read_accessor()?
            .find::<D, K>(filter, normalize_partition(partition))
    }

    fn find_with_options<D: Document<K>>(
        &self,
        filter: &Filter,
        options: &FindOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<D>> {
        self.read_accessor()?
            .find_with_options::<D, K>(filter, options, normalize_partition(partition))
    }

    fn get_all<D: Document<K>>(&self, partition: Option<&str>) -> RepositoryResult<Vec<D>> {
        self.read_accessor()?
            .get_all::<D, K>(normalize_partition(partition))
    }

    fn any<D: Document<K>>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<bool> {
        self.read_accessor()?
            .any::<D, K>(filter, normalize_partition(partition))
    }

    fn count<D: Document<K>>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<u64> {
        self.read_accessor()?
            .count::<D, K>(filter, normalize_partition(partition))
    }

    fn get_by_max<D: Document<K>>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<D>> {
        self.read_accessor()?
            .get_by_max::<D, K>(filter, field_name, normalize_partition(partition))
    }

    fn get_by_min<D: Document<K>>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<D>> {
        self.read_accessor()?
            .get_by_min::<D, K>(filter, field_name, normalize_partition(partition))
    }

    fn get_max_value<D: Document<K>, V: DeserializeOwned>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<V>> {
        self.read_accessor()?
            .get_max_value::<D, K, V>(filter, field_name, normalize_partition(partition))
    }

    fn get_min_value<D: Document<K>, V: DeserializeOwned>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<V>> {
        self.read_accessor()?
            .get_min_value::<D, K, V>(filter, field_name, normalize_partition(partition))
    }

    fn sum_by<D: Document<K>>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<f64> {
        self.read_accessor()?
            .sum_by::<D, K>(filter, field_name, normalize_partition(partition))
    }

    fn project_one<D: Document<K>, P: DeserializeOwned>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<Option<P>> {
        self.read_accessor()?
            .project_one::<D, K, P>(filter, normalize_partition(partition))
    }

    fn project_many<D: Document<K>, P: DeserializeOwned>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<P>> {
        self.read_accessor()?
            .project_many::<D, K, P>(filter, normalize_partition(partition))
    }

    fn group_by<D: Document<K>>(
        &self,
        filter: &Filter,
        field_name: &str,
        partition: Option<&str>,
    ) -> RepositoryResult<Vec<(Value, Vec<D>)>> {
        self.read_accessor()?
            .group_by::<D, K>(filter, field_name, normalize_partition(partition))
    }

    fn get_paginated<D: Document<K>>(
        &self,
        filter: &Filter,
        sort_field: &str,
        sort_order: SortOrder,
        page_number: u64,
        page_size: u64,
        partition: Option<&str>,
    ) -> RepositoryResult<Page<D>> {
        self.read_accessor()?.get_paginated::<D, K>(
            filter,
            sort_field,
            sort_order,
            page_number,
            page_size,
            normalize_partition(partition),
        )
    }
}
