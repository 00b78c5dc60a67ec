use super::{ReadOperations, RepositoryInner};
use crate::accessor::ReadAccessor;
use crate::document::{normalize_partition, Document, DocumentKey};
use crate::driver::{Filter, IndexDefinition, IndexOptions, UpdateDefinition, WriteResult};
use crate::errors::RepositoryResult;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A repository view for documents keyed by `K`.
///
/// Every view obtained from one [`Repository`](super::Repository) shares its
/// resolver and accessors; the key type only fixes the signatures. The
/// repository itself dereferences to the `DefaultKey` view.
///
/// Reads come from [`ReadOperations`]. Writes, index management and
/// collection administration are inherent methods. Each call goes through the
/// repository's accessor registry; the view never resolves collections on its
/// own except for `collection_name`, `drop_collection` and `partitions`.
pub struct KeyedRepository<K: DocumentKey> {
    inner: Arc<RepositoryInner>,
    _marker: PhantomData<fn() -> K>,
}

impl<K: DocumentKey> Clone for KeyedRepository<K> {
    fn clone(&self) -> Self {
        KeyedRepository::new(self.inner.clone())
    }
}

impl<K: DocumentKey> Debug for KeyedRepository<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyedRepository<{}>", std::any::type_name::<K>())
    }
}

impl<K: DocumentKey> ReadOperations<K> for KeyedRepository<K> {
    fn read_accessor(&self) -> RepositoryResult<Arc<ReadAccessor>> {
        self.inner.registry.reader()
    }
}

impl<K: DocumentKey> KeyedRepository<K> {
    pub(crate) fn new(inner: Arc<RepositoryInner>) -> Self {
        KeyedRepository {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if both views belong to the same repository instance.
    pub fn same_repository<L: DocumentKey>(&self, other: &KeyedRepository<L>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Inserts a document into its partition's collection. A generated key
    /// is written back into `document`.
    pub fn add_one<D: Document<K>>(&self, document: &mut D) -> RepositoryResult<WriteResult> {
        self.inner.registry.creator()?.add_one::<D, K>(document)
    }

    /// Inserts a batch of documents, grouped by partition.
    pub fn add_many<D: Document<K>>(&self, documents: &mut [D]) -> RepositoryResult<WriteResult> {
        self.inner.registry.creator()?.add_many::<D, K>(documents)
    }

    /// Replaces the stored document with the same key in the document's partition.
    pub fn update_one<D: Document<K>>(&self, document: &D) -> RepositoryResult<WriteResult> {
        self.inner.registry.updater()?.update_one::<D, K>(document)
    }

    pub fn update_one_by_id<D: Document<K>>(
        &self,
        id: &K,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult> {
        self.inner.registry.updater()?.update_one_by_id::<D, K>(
            id,
            update,
            normalize_partition(partition),
        )
    }

    pub fn update_one_by_filter<D: Document<K>>(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult> {
        self.inner.registry.updater()?.update_one_by_filter::<D, K>(
            filter,
            update,
            normalize_partition(partition),
        )
    }

    pub fn update_many<D: Document<K>>(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult> {
        self.inner.registry.updater()?.update_many::<D, K>(
            filter,
            update,
            normalize_partition(partition),
        )
    }

    pub fn delete_one<D: Document<K>>(&self, document: &D) -> RepositoryResult<u64> {
        self.inner.registry.deleter()?.delete_one::<D, K>(document)
    }

    pub fn delete_by_id<D: Document<K>>(&self, id: &K, partition: Option<&str>) -> RepositoryResult<u64> {
        self.inner
            .registry
            .deleter()?
            .delete_by_id::<D, K>(id, normalize_partition(partition))
    }

    pub fn delete_one_by_filter<D: Document<K>>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<u64> {
        self.inner
            .registry
            .deleter()?
            .delete_one_by_filter::<D, K>(filter, normalize_partition(partition))
    }

    pub fn delete_many_documents<D: Document<K>>(&self, documents: &[D]) -> RepositoryResult<u64> {
        self.inner
            .registry
            .deleter()?
            .delete_many_documents::<D, K>(documents)
    }

    pub fn delete_many<D: Document<K>>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<u64> {
        self.inner
            .registry
            .deleter()?
            .delete_many::<D, K>(filter, normalize_partition(partition))
    }

    pub fn get_index_names<D: Document<K>>(&self, partition: Option<&str>) -> RepositoryResult<Vec<String>> {
        self.inner
            .registry
            .index_manager()?
            .get_index_names::<D, K>(normalize_partition(partition))
    }

    pub fn create_index<D: Document<K>>(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner.registry.index_manager()?.create_index::<D, K>(
            definition,
            options,
            normalize_partition(partition),
        )
    }

    pub fn create_text_index<D: Document<K>>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner.registry.index_manager()?.create_text_index::<D, K>(
            field_name,
            options,
            normalize_partition(partition),
        )
    }

    pub fn create_ascending_index<D: Document<K>>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner
            .registry
            .index_manager()?
            .create_ascending_index::<D, K>(field_name, options, normalize_partition(partition))
    }

    pub fn create_descending_index<D: Document<K>>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner
            .registry
            .index_manager()?
            .create_descending_index::<D, K>(field_name, options, normalize_partition(partition))
    }

    pub fn create_hashed_index<D: Document<K>>(
        &self,
        field_name: &str,
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner
            .registry
            .index_manager()?
            .create_hashed_index::<D, K>(field_name, options, normalize_partition(partition))
    }

    pub fn create_combined_text_index<D: Document<K>>(
        &self,
        field_names: &[&str],
        options: &IndexOptions,
        partition: Option<&str>,
    ) -> RepositoryResult<String> {
        self.inner
            .registry
            .index_manager()?
            .create_combined_text_index::<D, K>(field_names, options, normalize_partition(partition))
    }

    pub fn drop_index<D: Document<K>>(&self, index_name: &str, partition: Option<&str>) -> RepositoryResult<()> {
        self.inner
            .registry
            .index_manager()?
            .drop_index::<D, K>(index_name, normalize_partition(partition))
    }

    /// Returns the physical collection name for `D` in `partition`.
    pub fn collection_name<D: Document<K>>(&self, partition: Option<&str>) -> RepositoryResult<String> {
        self.inner
            .resolver
            .collection_name::<D, K>(normalize_partition(partition))
    }

    /// Drops the collection of `D` in `partition`, documents and indexes included.
    pub fn drop_collection<D: Document<K>>(&self, partition: Option<&str>) -> RepositoryResult<()> {
        self.inner
            .resolver
            .drop_collection::<D, K>(normalize_partition(partition))
    }

    /// Lists the partitions of `D` that currently have a collection.
    pub fn partitions<D: Document<K>>(&self) -> RepositoryResult<Vec<String>> {
        self.inner.resolver.partitions::<D, K>()
    }
}
