//! Common types and helpers shared across the crate.

mod constants;
mod lock;
mod sort_order;
mod type_utils;

pub use constants::*;
pub use lock::*;
pub use sort_order::*;
pub use type_utils::*;
