use super::creator::group_by_partition;
use super::ensure_open;
use crate::collection::CollectionResolver;
use crate::common::DOC_ID;
use crate::document::{Document, DocumentKey};
use crate::driver::{field, Filter};
use crate::errors::RepositoryResult;

/// Delete capability. Every method returns the number of deleted documents.
#[derive(Debug)]
pub struct DeleteAccessor {
    resolver: CollectionResolver,
}

impl DeleteAccessor {
    pub fn new(resolver: CollectionResolver) -> RepositoryResult<Self> {
        ensure_open(&resolver, "delete")?;
        Ok(DeleteAccessor { resolver })
    }

    /// Deletes the stored copy of `document` from the document's partition.
    pub fn delete_one<D, K>(&self, document: &D) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve_for::<D, K>(document)?;
        let filter = collection.id_filter(document.id())?;
        Ok(collection.delete(&filter, true)?.deleted_count)
    }

    pub fn delete_by_id<D, K>(&self, id: &K, partition: Option<&str>) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let filter = collection.id_filter(id)?;
        Ok(collection.delete(&filter, true)?.deleted_count)
    }

    /// Deletes the first document matching `filter`.
    pub fn delete_one_by_filter<D, K>(
        &self,
        filter: &Filter,
        partition: Option<&str>,
    ) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        Ok(collection.delete(filter, true)?.deleted_count)
    }

    /// Deletes the stored copies of `documents`, one driver call per partition.
    pub fn delete_many_documents<D, K>(&self, documents: &[D]) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let mut deleted = 0;
        for (partition, group) in group_by_partition::<D, K>(documents) {
            let collection = self.resolver.resolve::<D, K>(partition.as_deref())?;
            let ids = group
                .iter()
                .map(|document| serde_json::to_value(document.id()))
                .collect::<Result<Vec<_>, _>>()?;
            deleted += collection
                .delete(&field(DOC_ID).in_list(ids), false)?
                .deleted_count;
        }
        Ok(deleted)
    }

    /// Deletes every document matching `filter`.
    pub fn delete_many<D, K>(&self, filter: &Filter, partition: Option<&str>) -> RepositoryResult<u64>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        Ok(collection.delete(filter, false)?.deleted_count)
    }
}
