//! The key contract: how a type declares itself as a document, what its key
//! type is, and whether its instances are partitioned.
//!
//! # Declaring documents
//!
//! ```rust,ignore
//! use docrepo_derive::Document;
//!
//! // Keyed by the default key type (Uuid), stored in "Order" or "Order-<tenant>"
//! #[derive(Clone, Serialize, Deserialize, Document)]
//! #[document(partition = "tenant")]
//! pub struct Order {
//!     pub id: Uuid,
//!     pub tenant: String,
//! }
//!
//! // Keyed by String, stored in "customers"
//! #[derive(Clone, Serialize, Deserialize, Document)]
//! #[document(name = "customers", key = "email")]
//! pub struct Customer {
//!     pub email: String,
//! }
//! ```

mod entity;
mod key;

pub use entity::*;
pub use key::*;
