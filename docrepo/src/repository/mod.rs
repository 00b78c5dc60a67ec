//! The repository facade.
//!
//! [`Repository`] is the entry point. It dereferences to a
//! [`KeyedRepository`] for the default key, so the common case reads
//! `repository.add_one(&mut order)`. Other key types are reached through
//! [`Repository::keyed`], and [`Repository::read_only`] hands out a view
//! without write operations.
//!
//! All views of one repository share a single set of accessors:
//!
//! ```rust,ignore
//! let orders = repository.find::<Order>(&field("status").eq("open"), Some("tenantA"))?;
//! let skus = repository.keyed::<String>().get_all::<Sku>(None)?;
//! ```
//!
//! Read operations live on the [`ReadOperations`] trait, which must be in
//! scope to call them.
mod keyed;
mod read_only;
mod read_operations;
mod repository;

pub use keyed::*;
pub use read_only::*;
pub use read_operations::*;
pub use repository::*;

pub(crate) use repository::RepositoryInner;
