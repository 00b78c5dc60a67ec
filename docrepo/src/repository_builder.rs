use crate::collection::validate_canonical_name;
use crate::driver::Database;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ReadOnlyRepository, Repository};
use crate::repository_config::RepositoryConfig;

/// Builder for opening a [`Repository`].
///
/// Configuration errors are captured as they happen and reported by
/// [`open`](RepositoryBuilder::open), so the chain itself never fails.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::Repository;
/// use docrepo::driver::{memory::InMemoryDatabase, Database};
///
/// let repository = Repository::builder()
///     .database(Database::new(InMemoryDatabase::new("shop")))
///     .collection_name::<Order>("orders")
///     .generate_ids(true)
///     .open()?;
/// ```
#[derive(Default)]
pub struct RepositoryBuilder {
    error: Option<RepositoryError>,
    config: RepositoryConfig,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        RepositoryBuilder {
            error: None,
            config: RepositoryConfig::new(),
        }
    }

    /// Sets the database the repository stores its collections in. Required.
    pub fn database(mut self, database: Database) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_database(database) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Overrides the canonical collection name of the document type `D`.
    ///
    /// The name is checked here: it must be non-empty, must not contain the
    /// partition separator and must not start with `$`.
    pub fn collection_name<D: 'static>(mut self, name: &str) -> Self {
        if self.error.is_none() {
            let result = validate_canonical_name(name)
                .and_then(|_| self.config.set_collection_name::<D>(name));
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
        self
    }

    /// Enables or disables key generation for documents inserted with an
    /// unset key.
    pub fn generate_ids(mut self, generate: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_generate_ids(generate) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the repository, returning the first configuration error if any.
    pub fn open(self) -> RepositoryResult<Repository> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize()?;
        log::debug!("Repository opened on database {}", self.config.database()?.name());
        Ok(Repository::new(self.config))
    }

    /// Opens the repository and returns its read-only view for the default key.
    pub fn open_read_only(self) -> RepositoryResult<ReadOnlyRepository> {
        let repository = self.open()?;
        Ok(repository.read_only())
    }
}
