use super::{CreateAccessor, DeleteAccessor, IndexAccessor, ReadAccessor, UpdateAccessor};
use crate::collection::CollectionResolver;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// A lazily filled, thread-safe holder for one shared accessor instance.
///
/// # States
/// - **Uninitialized**: nothing has been built or injected yet
/// - **Ready**: holds the instance every caller receives from now on
///
/// The transition happens at most once. Readers of a Ready slot only load the
/// `OnceLock`; the mutex is taken by the first callers while the slot is
/// still empty, so concurrent first calls run the factory exactly once. A
/// factory error leaves the slot Uninitialized, and the next call tries again.
pub struct AccessorSlot<T> {
    name: &'static str,
    value: OnceLock<Arc<T>>,
    init_lock: Mutex<()>,
}

impl<T> AccessorSlot<T> {
    pub fn new(name: &'static str) -> Self {
        AccessorSlot {
            name,
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the instance if the slot is Ready.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns the instance, building it with `factory` if the slot is empty.
    pub fn get_or_try_init<F>(&self, factory: F) -> RepositoryResult<Arc<T>>
    where
        F: FnOnce() -> RepositoryResult<T>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let _guard = self.init_lock.lock();
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        log::debug!("Constructing {} accessor", self.name);
        let value = Arc::new(factory()?);
        // only writer while the lock is held
        let _ = self.value.set(value.clone());
        Ok(value)
    }

    /// Fills an empty slot with a caller-provided instance.
    ///
    /// Fails with `AccessorAlreadyInitialized` if the slot is Ready; the
    /// existing instance is kept.
    pub fn inject(&self, value: Arc<T>) -> RepositoryResult<()> {
        let _guard = self.init_lock.lock();
        self.value.set(value).map_err(|_| {
            log::error!("The {} accessor is already initialized", self.name);
            RepositoryError::new(
                &format!("The {} accessor is already initialized", self.name),
                ErrorKind::AccessorAlreadyInitialized,
            )
        })
    }
}

/// The per-repository set of capability accessors.
///
/// Each accessor is built on first request from a clone of the repository's
/// [`CollectionResolver`] and then shared by every caller. Construction does
/// no I/O; it only fails when the database is already closed.
pub struct AccessorRegistry {
    resolver: CollectionResolver,
    reader: AccessorSlot<ReadAccessor>,
    creator: AccessorSlot<CreateAccessor>,
    updater: AccessorSlot<UpdateAccessor>,
    deleter: AccessorSlot<DeleteAccessor>,
    index_manager: AccessorSlot<IndexAccessor>,
}

impl AccessorRegistry {
    pub fn new(resolver: CollectionResolver) -> Self {
        AccessorRegistry {
            resolver,
            reader: AccessorSlot::new("read"),
            creator: AccessorSlot::new("create"),
            updater: AccessorSlot::new("update"),
            deleter: AccessorSlot::new("delete"),
            index_manager: AccessorSlot::new("index"),
        }
    }

    pub fn reader(&self) -> RepositoryResult<Arc<ReadAccessor>> {
        self.reader
            .get_or_try_init(|| ReadAccessor::new(self.resolver.clone()))
    }

    pub fn creator(&self) -> RepositoryResult<Arc<CreateAccessor>> {
        self.creator
            .get_or_try_init(|| CreateAccessor::new(self.resolver.clone()))
    }

    pub fn updater(&self) -> RepositoryResult<Arc<UpdateAccessor>> {
        self.updater
            .get_or_try_init(|| UpdateAccessor::new(self.resolver.clone()))
    }

    pub fn deleter(&self) -> RepositoryResult<Arc<DeleteAccessor>> {
        self.deleter
            .get_or_try_init(|| DeleteAccessor::new(self.resolver.clone()))
    }

    pub fn index_manager(&self) -> RepositoryResult<Arc<IndexAccessor>> {
        self.index_manager
            .get_or_try_init(|| IndexAccessor::new(self.resolver.clone()))
    }

    pub fn inject_reader(&self, accessor: Arc<ReadAccessor>) -> RepositoryResult<()> {
        self.reader.inject(accessor)
    }

    pub fn inject_creator(&self, accessor: Arc<CreateAccessor>) -> RepositoryResult<()> {
        self.creator.inject(accessor)
    }

    pub fn inject_updater(&self, accessor: Arc<UpdateAccessor>) -> RepositoryResult<()> {
        self.updater.inject(accessor)
    }

    pub fn inject_deleter(&self, accessor: Arc<DeleteAccessor>) -> RepositoryResult<()> {
        self.deleter.inject(accessor)
    }

    pub fn inject_index_manager(&self, accessor: Arc<IndexAccessor>) -> RepositoryResult<()> {
        self.index_manager.inject(accessor)
    }

    /// Number of accessors built or injected so far.
    pub fn initialized_count(&self) -> usize {
        [
            self.reader.is_initialized(),
            self.creator.is_initialized(),
            self.updater.is_initialized(),
            self.deleter.is_initialized(),
            self.index_manager.is_initialized(),
        ]
        .iter()
        .filter(|ready| **ready)
        .count()
    }
}
