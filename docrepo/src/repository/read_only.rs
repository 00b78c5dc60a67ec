use super::{ReadOperations, RepositoryInner};
use crate::accessor::ReadAccessor;
use crate::document::{DefaultKey, DocumentKey};
use crate::errors::RepositoryResult;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A repository view limited to [`ReadOperations`].
pub struct ReadOnlyRepository<K: DocumentKey = DefaultKey> {
    inner: Arc<RepositoryInner>,
    _marker: PhantomData<fn() -> K>,
}

impl<K: DocumentKey> Clone for ReadOnlyRepository<K> {
    fn clone(&self) -> Self {
        ReadOnlyRepository::new(self.inner.clone())
    }
}

impl<K: DocumentKey> Debug for ReadOnlyRepository<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReadOnlyRepository<{}>", std::any::type_name::<K>())
    }
}

impl<K: DocumentKey> ReadOperations<K> for ReadOnlyRepository<K> {
    fn read_accessor(&self) -> RepositoryResult<Arc<ReadAccessor>> {
        self.inner.registry.reader()
    }
}

impl<K: DocumentKey> ReadOnlyRepository<K> {
    pub(crate) fn new(inner: Arc<RepositoryInner>) -> Self {
        ReadOnlyRepository {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a read-only view for another key type.
    pub fn keyed<L: DocumentKey>(&self) -> ReadOnlyRepository<L> {
        ReadOnlyRepository::new(self.inner.clone())
    }
}
