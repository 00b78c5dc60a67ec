use super::{KeyedRepository, ReadOnlyRepository};
use crate::accessor::{
    AccessorRegistry, CreateAccessor, DeleteAccessor, IndexAccessor, ReadAccessor, UpdateAccessor,
};
use crate::collection::CollectionResolver;
use crate::document::{DefaultKey, DocumentKey};
use crate::errors::RepositoryResult;
use crate::repository_builder::RepositoryBuilder;
use crate::repository_config::RepositoryConfig;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

pub(crate) struct RepositoryInner {
    pub(crate) config: RepositoryConfig,
    pub(crate) resolver: CollectionResolver,
    pub(crate) registry: AccessorRegistry,
}

/// The entry point of the repository layer.
///
/// A `Repository` owns one [`CollectionResolver`] and one [`AccessorRegistry`].
/// It dereferences to the [`KeyedRepository`] view for [`DefaultKey`], so
/// documents keyed by `Uuid` need no key annotation at all. Documents with a
/// custom key go through [`Repository::keyed`]. Both paths share the same
/// accessors.
///
/// Cloning is cheap and every clone refers to the same repository.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::repository::ReadOperations;
/// use docrepo::Repository;
/// use docrepo::driver::{memory::InMemoryDatabase, Database};
///
/// let repository = Repository::builder()
///     .database(Database::new(InMemoryDatabase::new("shop")))
///     .open()?;
///
/// repository.add_one(&mut order)?;
/// let stored = repository.get_by_id::<Order>(order.id(), Some("tenantA"))?;
///
/// let skus = repository.keyed::<String>();
/// skus.add_one(&mut sku)?;
/// ```
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
    default_view: KeyedRepository<DefaultKey>,
}

impl Repository {
    /// Creates a new [`RepositoryBuilder`].
    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    pub(crate) fn new(config: RepositoryConfig) -> Self {
        let resolver = CollectionResolver::new(config.clone());
        let registry = AccessorRegistry::new(resolver.clone());
        let inner = Arc::new(RepositoryInner {
            config,
            resolver,
            registry,
        });
        Repository {
            default_view: KeyedRepository::new(inner.clone()),
            inner,
        }
    }

    /// Returns a view of this repository for documents keyed by `K`.
    pub fn keyed<K: DocumentKey>(&self) -> KeyedRepository<K> {
        KeyedRepository::new(self.inner.clone())
    }

    /// Returns a view exposing only the read operations, for documents keyed by `K`.
    pub fn read_only<K: DocumentKey>(&self) -> ReadOnlyRepository<K> {
        ReadOnlyRepository::new(self.inner.clone())
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &CollectionResolver {
        &self.inner.resolver
    }

    /// Returns `true` while the underlying database accepts operations.
    pub fn is_open(&self) -> bool {
        self.inner
            .resolver
            .database()
            .map(|database| database.is_open())
            .unwrap_or(false)
    }

    /// Closes the underlying database. Accessors built before the close stay
    /// cached, but every operation through them fails afterwards.
    pub fn close(&self) -> RepositoryResult<()> {
        self.inner.resolver.database()?.close()
    }

    pub fn reader(&self) -> RepositoryResult<Arc<ReadAccessor>> {
        self.inner.registry.reader()
    }

    pub fn creator(&self) -> RepositoryResult<Arc<CreateAccessor>> {
        self.inner.registry.creator()
    }

    pub fn updater(&self) -> RepositoryResult<Arc<UpdateAccessor>> {
        self.inner.registry.updater()
    }

    pub fn deleter(&self) -> RepositoryResult<Arc<DeleteAccessor>> {
        self.inner.registry.deleter()
    }

    pub fn index_manager(&self) -> RepositoryResult<Arc<IndexAccessor>> {
        self.inner.registry.index_manager()
    }

    /// Installs a prebuilt read accessor. Fails with
    /// `AccessorAlreadyInitialized` once the accessor has been built.
    pub fn inject_reader(&self, accessor: Arc<ReadAccessor>) -> RepositoryResult<()> {
        self.inner.registry.inject_reader(accessor)
    }

    pub fn inject_creator(&self, accessor: Arc<CreateAccessor>) -> RepositoryResult<()> {
        self.inner.registry.inject_creator(accessor)
    }

    pub fn inject_updater(&self, accessor: Arc<UpdateAccessor>) -> RepositoryResult<()> {
        self.inner.registry.inject_updater(accessor)
    }

    pub fn inject_deleter(&self, accessor: Arc<DeleteAccessor>) -> RepositoryResult<()> {
        self.inner.registry.inject_deleter(accessor)
    }

    pub fn inject_index_manager(&self, accessor: Arc<IndexAccessor>) -> RepositoryResult<()> {
        self.inner.registry.inject_index_manager(accessor)
    }

    /// Number of accessors built or injected so far.
    pub fn initialized_accessors(&self) -> usize {
        self.inner.registry.initialized_count()
    }
}

impl Deref for Repository {
    type Target = KeyedRepository<DefaultKey>;

    fn deref(&self) -> &Self::Target {
        &self.default_view
    }
}

impl Debug for Repository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.inner.resolver.database() {
            Ok(database) => write!(f, "Repository({})", database.name()),
            Err(_) => write!(f, "Repository(<unconfigured>)"),
        }
    }
}
