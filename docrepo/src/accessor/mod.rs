//! Capability accessors.
//!
//! Every repository capability (read, create, update, delete, index
//! management) is served by one accessor. An accessor holds nothing but a
//! [`CollectionResolver`]: each call resolves the target collection for the
//! document type and partition at hand and delegates to the driver.
//!
//! Accessors are built lazily by the [`AccessorRegistry`] and shared by every
//! caller of one repository instance.

mod creator;
mod deleter;
mod index_manager;
mod reader;
mod registry;
mod updater;

pub use creator::*;
pub use deleter::*;
pub use index_manager::*;
pub use reader::*;
pub use registry::*;
pub use updater::*;

use crate::collection::CollectionResolver;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

// Accessors may only be built over an open database.
pub(crate) fn ensure_open(resolver: &CollectionResolver, accessor: &str) -> RepositoryResult<()> {
    let database = resolver.database()?;
    if database.is_open() {
        return Ok(());
    }

    log::error!(
        "Cannot build the {} accessor, database {} is closed",
        accessor,
        database.name()
    );
    Err(RepositoryError::new(
        &format!("Database {} is closed", database.name()),
        ErrorKind::StoreAlreadyClosed,
    ))
}
