// document constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// naming constants
pub const PARTITION_SEPARATOR: &str = "-";
pub const RESERVED_NAME_PREFIX: &str = "$";

// index constants
pub const ID_INDEX_NAME: &str = "_id_";
pub const INDEX_NAME_SEPARATOR: &str = "_";
pub const ASCENDING_INDEX: &str = "1";
pub const DESCENDING_INDEX: &str = "-1";
pub const TEXT_INDEX: &str = "text";
pub const HASHED_INDEX: &str = "hashed";

pub const DOCREPO_VERSION: &str = env!("CARGO_PKG_VERSION");
