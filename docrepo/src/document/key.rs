use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use uuid::Uuid;

/// The key type used when a caller does not name one explicitly.
pub type DefaultKey = Uuid;

/// A primary key type for documents.
///
/// Keys are compared with `==` for "find by id" and "delete by id" style
/// operations and for duplicate detection inside a batch. The `Default`
/// value of a key means "not assigned yet"; such keys are replaced with a
/// generated value on insert when the key type knows how to generate one.
///
/// # Usage
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// pub struct Sku(String);
///
/// impl DocumentKey for Sku {
///     fn generate() -> Option<Self> {
///         None
///     }
/// }
/// ```
pub trait DocumentKey:
    Eq + Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Produces a fresh key, or `None` if keys of this type must be
    /// supplied by the caller.
    fn generate() -> Option<Self>;

    /// Returns `true` if the key still holds its unassigned default value.
    fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

impl DocumentKey for Uuid {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

impl DocumentKey for String {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4().hyphenated().to_string())
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! integer_key {
    ($($t:ty),*) => {
        $(
            impl DocumentKey for $t {
                fn generate() -> Option<Self> {
                    Some(rand::thread_rng().gen_range(1..=<$t>::MAX))
                }
            }
        )*
    };
}

integer_key!(i32, i64, u32, u64);
