//! In-memory reference driver.

mod collection;
mod database;

pub use collection::*;
pub use database::*;
