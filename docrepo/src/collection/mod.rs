//! Collection resolution.
//!
//! A document type is stored in one collection per partition. The physical
//! name of that collection is derived from the type's canonical name and the
//! partition key:
//!
//! | canonical | partition     | physical name   |
//! |-----------|---------------|-----------------|
//! | `Order`   | none or `""`  | `Order`         |
//! | `Order`   | `tenantA`     | `Order-tenantA` |
//!
//! [`CollectionResolver`] applies this convention and hands out typed
//! [`Collection`] views over the driver's handles.

mod naming;
mod resolver;
mod typed;

pub use naming::*;
pub use resolver::*;
pub use typed::*;
