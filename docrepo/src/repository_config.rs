//! Configuration of a repository instance.

use crate::driver::Database;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Configuration shared by a repository, its resolver and its accessors.
///
/// Settings can be changed until the configuration is initialized, which
/// happens when a repository is opened on it. Afterwards every setter fails
/// with `InvalidOperation`.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::RepositoryBuilder;
///
/// let repository = RepositoryBuilder::new()
///     .database(database)
///     .collection_name::<Order>("orders")
///     .open()?;
/// ```
#[derive(Clone)]
pub struct RepositoryConfig {
    inner: Arc<RepositoryConfigInner>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryConfig {
    pub fn new() -> Self {
        RepositoryConfig {
            inner: Arc::new(RepositoryConfigInner::new()),
        }
    }

    /// Returns the configured database.
    pub fn database(&self) -> RepositoryResult<Database> {
        self.inner.database()
    }

    /// Sets the database. Can be set only once.
    pub fn set_database(&self, database: Database) -> RepositoryResult<()> {
        self.inner.set_database(database)
    }

    /// Registers a canonical collection name for the document type `D`. It
    /// takes precedence over the name the type declares itself.
    pub fn set_collection_name<D: 'static>(&self, name: &str) -> RepositoryResult<()> {
        self.inner.set_collection_name(TypeId::of::<D>(), name)
    }

    /// Returns the canonical collection name registered for a document type.
    pub fn collection_name_for(&self, type_id: TypeId) -> Option<String> {
        self.inner.collection_name_for(type_id)
    }

    /// Whether unset keys are generated on insert. Enabled by default.
    pub fn generate_ids(&self) -> bool {
        self.inner.generate_ids.load(Ordering::Relaxed)
    }

    pub fn set_generate_ids(&self, generate: bool) -> RepositoryResult<()> {
        self.inner.set_generate_ids(generate)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    pub(crate) fn initialize(&self) -> RepositoryResult<()> {
        self.inner.initialize()
    }
}

struct RepositoryConfigInner {
    configured: AtomicBool,
    database: OnceLock<Database>,
    collection_names: DashMap<TypeId, String>,
    generate_ids: AtomicBool,
}

impl RepositoryConfigInner {
    fn new() -> Self {
        RepositoryConfigInner {
            configured: AtomicBool::from(false),
            database: OnceLock::new(),
            collection_names: DashMap::new(),
            generate_ids: AtomicBool::from(true),
        }
    }

    fn check_not_configured(&self, setting: &str) -> RepositoryResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(RepositoryError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn database(&self) -> RepositoryResult<Database> {
        match self.database.get() {
            Some(database) => Ok(database.clone()),
            None => {
                log::error!("No database is configured");
                Err(RepositoryError::new(
                    "No database is configured",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    fn set_database(&self, database: Database) -> RepositoryResult<()> {
        self.check_not_configured("Database")?;
        self.database.set(database).map_err(|_| {
            log::error!("Database is already configured");
            RepositoryError::new("Database is already configured", ErrorKind::InvalidOperation)
        })
    }

    fn set_collection_name(&self, type_id: TypeId, name: &str) -> RepositoryResult<()> {
        self.check_not_configured("Collection name")?;
        self.collection_names.insert(type_id, name.to_string());
        Ok(())
    }

    fn collection_name_for(&self, type_id: TypeId) -> Option<String> {
        self.collection_names
            .get(&type_id)
            .map(|entry| entry.value().clone())
    }

    fn set_generate_ids(&self, generate: bool) -> RepositoryResult<()> {
        self.check_not_configured("Id generation")?;
        self.generate_ids.store(generate, Ordering::Relaxed);
        Ok(())
    }

    fn initialize(&self) -> RepositoryResult<()> {
        let database = self.database()?;
        if !database.is_open() {
            log::error!("Database {} is closed", database.name());
            return Err(RepositoryError::new(
                &format!("Database {} is closed", database.name()),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        self.configured.store(true, Ordering::Relaxed);
        Ok(())
    }
}
