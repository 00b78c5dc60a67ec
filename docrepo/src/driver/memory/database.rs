use super::{CollectionStore, InMemoryCollection};
use crate::common::{LockHandle, LockRegistry};
use crate::driver::{CollectionHandle, DatabaseProvider};
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory implementation of a document database.
///
/// # Purpose
/// A complete, dependency-free driver for tests and embedded use. Nothing is
/// persisted; all data is lost when the last handle is dropped or the
/// database is closed.
///
/// # Characteristics
/// - **Lazy registration**: `collection(name)` hands out a handle without
///   touching the catalog; a collection is listed once something is written
///   to it or an index is created on it
/// - **Per-collection locking**: one lock from a [`LockRegistry`] per name
/// - **Close semantics**: after `close()` every call on the database and on
///   every handle obtained from it fails with `StoreAlreadyClosed`
///
/// # Usage
/// ```
/// use docrepo::driver::memory::InMemoryDatabase;
/// use docrepo::driver::{Database, DatabaseProvider};
///
/// let database = Database::new(InMemoryDatabase::new("shop"));
/// let orders = database.collection("Order").unwrap();
/// assert_eq!(orders.name(), "Order");
/// assert!(database.list_collection_names().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct InMemoryDatabase {
    inner: Arc<InMemoryDatabaseInner>,
}

impl InMemoryDatabase {
    pub fn new(name: &str) -> Self {
        InMemoryDatabase {
            inner: Arc::new(InMemoryDatabaseInner {
                name: name.to_string(),
                collections: DashMap::new(),
                lock_registry: LockRegistry::new(),
                closed: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub(crate) fn existing_store(&self, name: &str) -> RepositoryResult<Option<Arc<CollectionStore>>> {
        self.inner.check_opened()?;
        Ok(self
            .inner
            .collections
            .get(name)
            .map(|entry| entry.value().clone()))
    }

    pub(crate) fn materialize_store(&self, name: &str) -> RepositoryResult<Arc<CollectionStore>> {
        self.inner.check_opened()?;
        let store = self
            .inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating collection {} in database {}", name, self.inner.name);
                Arc::new(self.inner.new_store(name, self.inner.lock_registry.get_lock(name)))
            })
            .clone();
        Ok(store)
    }

    pub(crate) fn empty_store(&self, name: &str) -> Arc<CollectionStore> {
        Arc::new(self.inner.new_store(name, LockHandle::new()))
    }
}

impl DatabaseProvider for InMemoryDatabase {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn collection(&self, name: &str) -> RepositoryResult<CollectionHandle> {
        self.inner.check_opened()?;

        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(RepositoryError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidCollectionName,
            ));
        }
        Ok(CollectionHandle::new(InMemoryCollection::new(name, self.clone())))
    }

    fn drop_collection(&self, name: &str) -> RepositoryResult<()> {
        self.inner.drop_collection(name)
    }

    fn list_collection_names(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_collection_names()
    }

    fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::Relaxed)
    }

    fn close(&self) -> RepositoryResult<()> {
        self.inner.close()
    }
}

struct InMemoryDatabaseInner {
    name: String,
    collections: DashMap<String, Arc<CollectionStore>>,
    lock_registry: LockRegistry,
    closed: Arc<AtomicBool>,
}

impl InMemoryDatabaseInner {
    fn check_opened(&self) -> RepositoryResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Database {} is closed", self.name);
            return Err(RepositoryError::new(
                &format!("Database {} is closed", self.name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn new_store(&self, name: &str, lock: LockHandle) -> CollectionStore {
        CollectionStore::new(name, &self.name, lock, self.closed.clone())
    }

    fn drop_collection(&self, name: &str) -> RepositoryResult<()> {
        self.check_opened()?;

        if let Some((_, store)) = self.collections.remove(name) {
            log::debug!("Dropping collection {} from database {}", name, self.name);
            store.mark_dropped();
            self.lock_registry.remove_lock(name);
        }
        Ok(())
    }

    fn list_collection_names(&self) -> RepositoryResult<Vec<String>> {
        self.check_opened()?;

        let mut names = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    fn close(&self) -> RepositoryResult<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        log::debug!("Closing database {}", self.name);
        self.collections.clear();
        Ok(())
    }
}
