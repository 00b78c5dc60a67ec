use crate::common::short_type_name;
use crate::document::{DefaultKey, DocumentKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A document type persisted in one collection, or in one partitioned family
/// of collections.
///
/// The type parameter `K` is the key type. It defaults to [`DefaultKey`], so
/// most declarations read `impl Document for Order`; types keyed by something
/// else name it explicitly, e.g. `impl Document<String> for Customer`.
///
/// # Characteristics
/// - The key type of a document type is fixed. Using one document type with
///   two key types against the same repository is rejected at resolution.
/// - `collection_name()` defaults to the unqualified type name (`Order`).
/// - Partitioned types override `as_partitioned()`; everything else is never
///   partitioned.
///
/// # Usage
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Order {
///     id: Uuid,
///     tenant: String,
/// }
///
/// impl Document for Order {
///     fn id(&self) -> &Uuid { &self.id }
///     fn set_id(&mut self, id: Uuid) { self.id = id; }
///     fn as_partitioned(&self) -> Option<&dyn PartitionedDocument> { Some(self) }
/// }
///
/// impl PartitionedDocument for Order {
///     fn partition_key(&self) -> Option<&str> { Some(&self.tenant) }
/// }
/// ```
pub trait Document<K: DocumentKey = DefaultKey>:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Returns the document's key.
    fn id(&self) -> &K;

    /// Replaces the document's key. Used when a key is generated on insert.
    fn set_id(&mut self, id: K);

    /// Returns the canonical collection name of this document type.
    ///
    /// A name registered on the repository configuration takes precedence.
    fn collection_name() -> String {
        short_type_name::<Self>()
    }

    /// Returns the partition capability of this instance, if the type is
    /// partitioned.
    fn as_partitioned(&self) -> Option<&dyn PartitionedDocument> {
        None
    }
}

/// Capability implemented only by partitioned document types.
pub trait PartitionedDocument {
    /// Returns the partition this instance belongs to. `None` and `Some("")`
    /// both mean the instance lives in the default, unpartitioned collection.
    fn partition_key(&self) -> Option<&str>;
}

/// Conversion used by `#[derive(Document)]` to read a partition field of
/// type `String` or `Option<String>` uniformly.
pub trait AsPartitionKey {
    fn as_partition_key(&self) -> Option<&str>;
}

impl AsPartitionKey for String {
    fn as_partition_key(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl AsPartitionKey for Option<String> {
    fn as_partition_key(&self) -> Option<&str> {
        self.as_deref()
    }
}

impl AsPartitionKey for &str {
    fn as_partition_key(&self) -> Option<&str> {
        Some(self)
    }
}

/// Treats an absent and an empty partition key the same way.
#[inline]
pub fn normalize_partition(partition_key: Option<&str>) -> Option<&str> {
    partition_key.filter(|key| !key.is_empty())
}

/// Returns the effective partition of a document instance.
///
/// Non-partitioned types always yield `None`. Partitioned instances whose
/// partition key is absent or empty also yield `None`, so the call falls back
/// to the default collection instead of failing.
pub fn partition_of<D, K>(document: &D) -> Option<&str>
where
    D: Document<K>,
    K: DocumentKey,
{
    let partitioned = document.as_partitioned()?;
    normalize_partition(partitioned.partition_key())
}
