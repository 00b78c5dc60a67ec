use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A shareable handle to one named read-write lock.
///
/// The in-memory driver hands one handle to each collection so that
/// check-then-write sequences (unique index checks followed by the write)
/// run atomically with respect to other writers of the same collection.
#[derive(Clone)]
pub struct LockHandle {
    lock: Arc<RwLock<()>>,
}

impl LockHandle {
    pub fn new() -> Self {
        LockHandle {
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

impl Default for LockHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of named read-write locks, one per physical collection name.
///
/// Two handles obtained for the same name guard the same lock, so every
/// handle to a physical collection serialises its writes against the others.
///
/// # Examples
///
/// ```
/// use docrepo::common::LockRegistry;
///
/// let registry = LockRegistry::new();
/// let lock = registry.get_lock("Order-tenantA");
/// {
///     let _guard = lock.write();
/// }
/// assert_eq!(registry.lock_count(), 1);
/// ```
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<DashMap<String, LockHandle>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Returns the lock registered under `name`, creating it on first request.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        if let Some(lock) = self.locks.get(name) {
            return lock.value().clone();
        }

        self.locks
            .entry(name.to_string())
            .or_insert_with(LockHandle::new)
            .value()
            .clone()
    }

    /// Forgets the lock for `name`. Returns `true` if it was registered.
    pub fn remove_lock(&self, name: &str) -> bool {
        self.locks.remove(name).is_some()
    }

    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
