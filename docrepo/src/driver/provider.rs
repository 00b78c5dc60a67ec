use crate::driver::{
    Filter, FindOptions, IndexDefinition, IndexDescriptor, IndexOptions, RawDocument,
    UpdateDefinition, WriteResult,
};
use crate::errors::RepositoryResult;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Low-level interface of a document database.
///
/// # Purpose
/// The repository layer never talks to storage directly. It asks a database
/// provider for collection handles by physical name and delegates every
/// document operation to those handles.
///
/// # Characteristics
/// - `collection` must not change what the database holds: an unknown name
///   yields a handle that reads as empty, and the collection comes into
///   existence on the first write or index creation through it.
/// - After `close`, every call fails with `ErrorKind::StoreAlreadyClosed`.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; one database is shared by every
/// repository, resolver and accessor built on top of it.
pub trait DatabaseProvider: Send + Sync {
    /// Returns the database name.
    fn name(&self) -> String;

    /// Returns a handle to the named collection without creating it.
    fn collection(&self, name: &str) -> RepositoryResult<CollectionHandle>;

    /// Drops the named collection. Dropping an unknown collection is a no-op.
    fn drop_collection(&self, name: &str) -> RepositoryResult<()>;

    /// Lists the physical names of collections that have been written to.
    fn list_collection_names(&self) -> RepositoryResult<Vec<String>>;

    /// Returns `false` once the database has been closed.
    fn is_open(&self) -> bool;

    /// Closes the database. Closing twice is a no-op.
    fn close(&self) -> RepositoryResult<()>;
}

/// Shared handle to a database provider. Cloning is cheap.
#[derive(Clone)]
pub struct Database {
    inner: Arc<dyn DatabaseProvider>,
}

impl Database {
    pub fn new<T: DatabaseProvider + 'static>(inner: T) -> Self {
        Database {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Database {
    type Target = Arc<dyn DatabaseProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database({})", self.inner.name())
    }
}

/// Low-level interface of one physical collection.
///
/// Documents cross this boundary as [`RawDocument`]s whose `_id` field holds
/// the document key. Implementations must keep `_id` unique and immutable.
pub trait CollectionProvider: Send + Sync {
    /// Physical collection name.
    fn name(&self) -> String;

    /// Name of the owning database.
    fn database_name(&self) -> String;

    fn insert_one(&self, document: RawDocument) -> RepositoryResult<WriteResult>;

    /// Inserts all documents or none of them.
    fn insert_many(&self, documents: Vec<RawDocument>) -> RepositoryResult<WriteResult>;

    /// Returns the matching documents, sorted and paginated by `options`.
    fn find(&self, filter: &Filter, options: &FindOptions) -> RepositoryResult<Vec<RawDocument>>;

    fn count(&self, filter: &Filter) -> RepositoryResult<u64>;

    /// Replaces the first document matching `filter`. With `upsert`, inserts
    /// the replacement when nothing matches.
    fn replace_one(
        &self,
        filter: &Filter,
        replacement: RawDocument,
        upsert: bool,
    ) -> RepositoryResult<WriteResult>;

    /// Applies `update` to the first match (`just_once`) or to every match.
    fn update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
        just_once: bool,
    ) -> RepositoryResult<WriteResult>;

    /// Deletes the first match (`just_once`) or every match.
    fn delete(&self, filter: &Filter, just_once: bool) -> RepositoryResult<WriteResult>;

    /// Creates an index and returns its name. Creating an identical index
    /// again is a no-op returning the same name.
    fn create_index(
        &self,
        definition: &IndexDefinition,
        options: &IndexOptions,
    ) -> RepositoryResult<String>;

    fn list_indexes(&self) -> RepositoryResult<Vec<IndexDescriptor>>;

    fn drop_index(&self, name: &str) -> RepositoryResult<()>;
}

/// Shared handle to a collection provider. Cloning is cheap.
#[derive(Clone)]
pub struct CollectionHandle {
    inner: Arc<dyn CollectionProvider>,
}

impl CollectionHandle {
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        CollectionHandle {
            inner: Arc::new(inner),
        }
    }

    /// Returns `true` if both handles address the same physical collection.
    pub fn same_collection(&self, other: &CollectionHandle) -> bool {
        self.inner.database_name() == other.inner.database_name()
            && self.inner.name() == other.inner.name()
    }
}

impl Deref for CollectionHandle {
    type Target = Arc<dyn CollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for CollectionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CollectionHandle({}.{})",
            self.inner.database_name(),
            self.inner.name()
        )
    }
}
