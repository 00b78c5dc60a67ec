use super::ensure_open;
use crate::collection::CollectionResolver;
use crate::document::{Document, DocumentKey};
use crate::driver::{Filter, UpdateDefinition, WriteResult};
use crate::errors::RepositoryResult;

/// Update capability: whole-document replacement and field updates.
#[derive(Debug)]
pub struct UpdateAccessor {
    resolver: CollectionResolver,
}

impl UpdateAccessor {
    pub fn new(resolver: CollectionResolver) -> RepositoryResult<Self> {
        ensure_open(&resolver, "update")?;
        Ok(UpdateAccessor { resolver })
    }

    /// Replaces the stored document having the same key, in the document's
    /// own partition. Nothing is inserted if no such document exists; the
    /// result's `matched_count` is then zero.
    pub fn update_one<D, K>(&self, document: &D) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve_for::<D, K>(document)?
            .replace(document, false)
    }

    pub fn update_one_by_id<D, K>(
        &self,
        id: &K,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let collection = self.resolver.resolve::<D, K>(partition)?;
        let filter = collection.id_filter(id)?;
        collection.update(&filter, update, true)
    }

    /// Applies `update` to the first document matching `filter`.
    pub fn update_one_by_filter<D, K>(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve::<D, K>(partition)?
            .update(filter, update, true)
    }

    /// Applies `update` to every document matching `filter`.
    pub fn update_many<D, K>(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        partition: Option<&str>,
    ) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolver
            .resolve::<D, K>(partition)?
            .update(filter, update, false)
    }
}
