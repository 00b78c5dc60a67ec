//! The boundary between the repository layer and a document database driver.
//!
//! A driver implements [`DatabaseProvider`] and [`CollectionProvider`] over
//! [`RawDocument`]s. The driver-native constructs in this module
//! ([`Filter`], [`UpdateDefinition`], [`FindOptions`], [`IndexDefinition`],
//! [`IndexOptions`], [`WriteResult`]) are passed through the repository
//! layer untouched.
//!
//! [`memory`] contains the in-memory reference driver.

mod filter;
mod find_options;
mod index;
pub mod memory;
mod provider;
mod update;
pub mod value;
mod write_result;

pub use filter::*;
pub use find_options::*;
pub use index::*;
pub use provider::*;
pub use update::*;
pub use value::RawDocument;
pub use write_result::*;
