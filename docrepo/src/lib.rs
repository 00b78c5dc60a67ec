//! # docrepo - Generic Document Repository
//!
//! docrepo is a typed repository layer over document databases. It maps
//! Rust document types to collections, splits them into partitions and
//! hands out the create, read, update, delete and index capabilities through
//! one shared facade.
//!
//! ## Key Features
//!
//! - **Typed documents**: any `Serialize + DeserializeOwned` struct with a key
//! - **Custom keys**: `Uuid` by default, or any [`DocumentKey`] type
//! - **Partitions**: one physical collection per `(type, partition)` pair
//! - **Lazy accessors**: each capability is built once, on first use, and shared
//! - **Pluggable drivers**: [`driver::DatabaseProvider`] with an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docrepo::driver::{field, memory::InMemoryDatabase, Database};
//! use docrepo::repository::ReadOperations;
//! use docrepo::Repository;
//! use docrepo_derive::Document;
//!
//! #[derive(Document, Serialize, Deserialize)]
//! #[document(partition = "tenant")]
//! struct Order {
//!     id: Uuid,
//!     tenant: Option<String>,
//!     status: String,
//! }
//!
//! let repository = Repository::builder()
//!     .database(Database::new(InMemoryDatabase::new("shop")))
//!     .open()?;
//!
//! repository.add_one(&mut order)?;          // stored in "Order-tenantA"
//! let open = repository.find::<Order>(&field("status").eq("open"), Some("tenantA"))?;
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - The facade: [`Repository`], keyed and read-only views
//! - [`accessor`] - Capability accessors and their lazy registry
//! - [`collection`] - Collection naming, resolution and typed collections
//! - [`document`] - The document and key contracts
//! - [`driver`] - The database driver contract, filters, updates and indexes
//! - [`errors`] - Error types
//! - [`common`] - Shared utilities

pub mod accessor;
pub mod collection;
pub mod common;
pub mod document;
pub mod driver;
pub mod errors;
pub mod repository;
mod repository_builder;
mod repository_config;

pub use document::{DefaultKey, Document, DocumentKey, PartitionedDocument};
pub use errors::{ErrorKind, RepositoryError, RepositoryResult};
pub use repository::{KeyedRepository, ReadOnlyRepository, ReadOperations, Repository};
pub use repository_builder::*;
pub use repository_config::*;
