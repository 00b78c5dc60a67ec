use crate::common::{PARTITION_SEPARATOR, RESERVED_NAME_PREFIX};
use crate::document::normalize_partition;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

/// Builds the physical collection name for a canonical name and an optional
/// partition: `Order` and `tenantA` give `Order-tenantA`; no partition (or an
/// empty one) gives `Order`.
///
/// The canonical name is validated first, see [`validate_canonical_name`].
pub fn collection_name(canonical_name: &str, partition: Option<&str>) -> RepositoryResult<String> {
    validate_canonical_name(canonical_name)?;

    match normalize_partition(partition) {
        Some(partition) => {
            let mut result = String::with_capacity(
                canonical_name.len() + PARTITION_SEPARATOR.len() + partition.len(),
            );
            result.push_str(canonical_name);
            result.push_str(PARTITION_SEPARATOR);
            result.push_str(partition);
            Ok(result)
        }
        None => Ok(canonical_name.to_string()),
    }
}

/// Splits a physical collection name back into its canonical name and
/// partition. Canonical names never contain the separator, so the first
/// separator is the boundary; partitions may contain it.
pub fn split_collection_name(name: &str) -> (&str, Option<&str>) {
    match name.split_once(PARTITION_SEPARATOR) {
        Some((canonical, partition)) => (canonical, normalize_partition(Some(partition))),
        None => (name, None),
    }
}

/// Checks that a canonical collection name is usable.
///
/// A canonical name must be non-empty, must not contain the partition
/// separator and must not start with the reserved prefix.
pub fn validate_canonical_name(canonical_name: &str) -> RepositoryResult<()> {
    if canonical_name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(RepositoryError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidCollectionName,
        ));
    }

    if canonical_name.contains(PARTITION_SEPARATOR) {
        log::error!("{} is not a valid collection name", canonical_name);
        return Err(RepositoryError::new(
            &format!(
                "{} is not a valid collection name, it contains the partition separator '{}'",
                canonical_name, PARTITION_SEPARATOR
            ),
            ErrorKind::InvalidCollectionName,
        ));
    }

    if canonical_name.starts_with(RESERVED_NAME_PREFIX) {
        log::error!("{} is not a valid collection name", canonical_name);
        return Err(RepositoryError::new(
            &format!(
                "{} is not a valid collection name, the prefix '{}' is reserved",
                canonical_name, RESERVED_NAME_PREFIX
            ),
            ErrorKind::InvalidCollectionName,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpartitioned_name() {
        assert_eq!(collection_name("Order", None).unwrap(), "Order");
    }

    #[test]
    fn test_partitioned_name() {
        assert_eq!(
            collection_name("Order", Some("tenantA")).unwrap(),
            "Order-tenantA"
        );
    }

    #[test]
    fn test_empty_partition_is_unpartitioned() {
        assert_eq!(collection_name("Order", Some("")).unwrap(), "Order");
    }

    #[test]
    fn test_invalid_canonical_names() {
        for name in ["", "Sales-Order", "$system"] {
            let error = collection_name(name, None).unwrap_err();
            assert_eq!(error.kind(), &ErrorKind::InvalidCollectionName);
        }
    }

    #[test]
    fn test_split() {
        assert_eq!(split_collection_name("Order"), ("Order", None));
        assert_eq!(split_collection_name("Order-tenantA"), ("Order", Some("tenantA")));
        assert_eq!(split_collection_name("Order-eu-west"), ("Order", Some("eu-west")));
    }

    #[test]
    fn test_split_reverses_naming() {
        for partition in [None, Some("tenantA"), Some("eu-west-1")] {
            let name = collection_name("Order", partition).unwrap();
            assert_eq!(split_collection_name(&name), ("Order", partition));
        }
    }
}
