use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for repository operations.
///
/// Each kind names one category of failure so callers can branch on it
/// without parsing messages. Configuration errors (`InvalidCollectionName`,
/// `KeyTypeMismatch`, `StoreAlreadyClosed`) are raised at first use and are
/// never retried by the repository itself.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{ErrorKind, RepositoryError, RepositoryResult};
///
/// fn example() -> RepositoryResult<()> {
///     Err(RepositoryError::new("Index not found", ErrorKind::IndexNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Configuration Errors
    /// No valid collection name can be derived for a document type
    InvalidCollectionName,
    /// A document type was used with two different key types
    KeyTypeMismatch,
    /// The database has been closed and no handle can be obtained
    StoreAlreadyClosed,

    // Accessor Errors
    /// A capability accessor slot was already filled
    AccessorAlreadyInitialized,

    // ID Errors
    /// The provided ID is invalid or missing
    InvalidId,
    /// Two documents in one write share the same ID
    DuplicateId,

    // Lookup Errors
    /// Collection does not exist (or was dropped under a handle)
    CollectionNotFound,

    // Indexing Errors
    /// Index does not exist
    IndexNotFound,
    /// Index with the same name already exists
    IndexAlreadyExists,
    /// A unique constraint was violated
    UniqueConstraintViolation,

    // Query Errors
    /// Error while applying an update definition
    UpdateError,

    // Data Encoding Errors
    /// Error mapping a document to or from its stored representation
    ObjectMappingError,

    // Validation Errors
    /// The operation is not valid in the current context
    InvalidOperation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidCollectionName => write!(f, "Invalid collection name"),
            ErrorKind::KeyTypeMismatch => write!(f, "Key type mismatch"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::AccessorAlreadyInitialized => write!(f, "Accessor already initialized"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::DuplicateId => write!(f, "Duplicate ID"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::IndexNotFound => write!(f, "Index not found"),
            ErrorKind::IndexAlreadyExists => write!(f, "Index already exists"),
            ErrorKind::UniqueConstraintViolation => write!(f, "Unique constraint violation"),
            ErrorKind::UpdateError => write!(f, "Update error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
        }
    }
}

/// Repository error type.
///
/// `RepositoryError` carries a message, a kind, an optional cause and a
/// backtrace captured at construction time.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{ErrorKind, RepositoryError};
///
/// let cause = RepositoryError::new("store closed", ErrorKind::StoreAlreadyClosed);
/// let err = RepositoryError::new_with_cause(
///     "Failed to open collection",
///     ErrorKind::InvalidOperation,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct RepositoryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepositoryError>>,
    backtrace: Atomic<Backtrace>,
}

impl RepositoryError {
    /// Creates a new `RepositoryError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `RepositoryError` chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepositoryError) -> Self {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepositoryError> {
        self.cause.as_deref()
    }
}

impl Display for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for RepositoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, RepositoryError>`.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::new(
            &format!("Document mapping error: {}", err),
            ErrorKind::ObjectMappingError,
        )
    }
}
