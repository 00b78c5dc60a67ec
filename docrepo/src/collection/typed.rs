use crate::common::DOC_ID;
use crate::document::{DefaultKey, Document, DocumentKey};
use crate::driver::value::into_raw_document;
use crate::driver::{
    by_id, CollectionHandle, Filter, FindOptions, IndexDefinition, IndexDescriptor, IndexOptions,
    RawDocument, UpdateDefinition, WriteResult,
};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A physical collection viewed through one document type.
///
/// Documents are converted with `serde_json`; the document key is written to
/// the `_id` field of the stored document and read back from it. The handle
/// is the one handed out by the driver, so two `Collection`s resolved for the
/// same name address the same stored data.
pub struct Collection<D, K = DefaultKey> {
    handle: CollectionHandle,
    _marker: PhantomData<fn() -> (D, K)>,
}

impl<D, K> Clone for Collection<D, K> {
    fn clone(&self) -> Self {
        Collection {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D, K> Debug for Collection<D, K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collection({:?})", self.handle)
    }
}

impl<D, K> Collection<D, K>
where
    D: Document<K>,
    K: DocumentKey,
{
    pub(crate) fn new(handle: CollectionHandle) -> Self {
        Collection {
            handle,
            _marker: PhantomData,
        }
    }

    /// The untyped driver handle.
    pub fn handle(&self) -> &CollectionHandle {
        &self.handle
    }

    /// The physical collection name.
    pub fn name(&self) -> String {
        self.handle.name()
    }

    /// Returns `true` if both collections address the same physical collection.
    pub fn same_collection(&self, other: &Collection<D, K>) -> bool {
        self.handle.same_collection(&other.handle)
    }

    /// Builds the filter selecting the document stored under `id`.
    pub fn id_filter(&self, id: &K) -> RepositoryResult<Filter> {
        by_id(id)
    }

    pub fn to_raw(&self, document: &D) -> RepositoryResult<RawDocument> {
        let id = serde_json::to_value(document.id())?;
        let mut raw = into_raw_document(serde_json::to_value(document)?)?;
        if let Some(existing) = raw.get(DOC_ID) {
            if *existing != id {
                log::error!(
                    "Document serializes its own {} field {} which differs from its key {}",
                    DOC_ID,
                    existing,
                    id
                );
                return Err(RepositoryError::new(
                    &format!("Field '{}' is reserved for the document key", DOC_ID),
                    ErrorKind::ObjectMappingError,
                ));
            }
        }
        raw.insert(DOC_ID.to_string(), id);
        Ok(raw)
    }

    pub fn from_raw(&self, raw: RawDocument) -> RepositoryResult<D> {
        let id = raw.get(DOC_ID).cloned().unwrap_or(Value::Null);
        let mut document: D = serde_json::from_value(Value::Object(raw))?;
        let id: K = serde_json::from_value(id)?;
        document.set_id(id);
        Ok(document)
    }

    /// Deserializes raw documents into an arbitrary projection type.
    pub fn project<P: DeserializeOwned>(&self, raw: RawDocument) -> RepositoryResult<P> {
        Ok(serde_json::from_value(Value::Object(raw))?)
    }

    pub fn insert_one(&self, document: &D) -> RepositoryResult<WriteResult> {
        let raw = self.to_raw(document)?;
        self.handle.insert_one(raw)
    }

    pub fn insert_many<'a, I>(&self, documents: I) -> RepositoryResult<WriteResult>
    where
        I: IntoIterator<Item = &'a D>,
        D: 'a,
    {
        let raw = documents
            .into_iter()
            .map(|document| self.to_raw(document))
            .collect::<RepositoryResult<Vec<_>>>()?;
        self.handle.insert_many(raw)
    }

    pub fn find(&self, filter: &Filter, options: &FindOptions) -> RepositoryResult<Vec<D>> {
        self.find_raw(filter, options)?
            .into_iter()
            .map(|raw| self.from_raw(raw))
            .collect()
    }

    pub fn find_raw(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> RepositoryResult<Vec<RawDocument>> {
        self.handle.find(filter, options)
    }

    /// Returns the first match in `options` order, if any.
    pub fn find_one(&self, filter: &Filter, options: &FindOptions) -> RepositoryResult<Option<D>> {
        let options = options.clone().limit(1);
        Ok(self.find(filter, &options)?.into_iter().next())
    }

    pub fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        self.handle.count(filter)
    }

    /// Replaces the stored document that has the same key as `document`.
    pub fn replace(&self, document: &D, upsert: bool) -> RepositoryResult<WriteResult> {
        let filter = self.id_filter(document.id())?;
        let raw = self.to_raw(document)?;
        self.handle.replace_one(&filter, raw, upsert)
    }

    pub fn update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        just_once: bool,
    ) -> RepositoryResult<WriteResult> {
        self.handle.update(filter, update, just_once)
    }

    pub fn delete(&self, filter: &Filter, just_once: bool) -> RepositoryResult<WriteResult> {
        self.handle.delete(filter, just_once)
    }

    pub fn create_index(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
    ) -> RepositoryResult<String> {
        self.handle.create_index(definition, options)
    }

    pub fn list_indexes(&self) -> RepositoryResult<Vec<IndexDescriptor>> {
        self.handle.list_indexes()
    }

    pub fn drop_index(&self, name: &str) -> RepositoryResult<()> {
        self.handle.drop_index(name)
    }
}
