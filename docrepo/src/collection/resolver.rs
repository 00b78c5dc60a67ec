use super::naming::{collection_name, split_collection_name, validate_canonical_name};
use super::Collection;
use crate::document::{partition_of, Document, DocumentKey};
use crate::driver::Database;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::repository_config::RepositoryConfig;
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Maps a document type and an optional partition to a physical collection.
///
/// # Purpose
/// The resolver is the only component that turns `(document type, partition)`
/// into a collection name and asks the database for the matching handle.
/// Accessors capture a clone of it and resolve on every call.
///
/// # Characteristics
/// - **Deterministic**: the same type and partition always give the same name
/// - **No handle cache**: every resolution asks the database provider, so a
///   dropped or closed database is observed immediately
/// - **Fixed key type**: the first key type a document type is resolved with
///   is recorded; resolving it later with another key type fails with
///   `KeyTypeMismatch`
///
/// Cloning is cheap and clones share the key ledger.
#[derive(Clone)]
pub struct CollectionResolver {
    inner: Arc<CollectionResolverInner>,
}

impl CollectionResolver {
    pub fn new(config: RepositoryConfig) -> Self {
        CollectionResolver {
            inner: Arc::new(CollectionResolverInner {
                config,
                key_bindings: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.inner.config
    }

    pub fn database(&self) -> RepositoryResult<Database> {
        self.inner.config.database()
    }

    /// Returns the collection storing documents of type `D` in `partition`.
    /// `None` and `Some("")` both select the unpartitioned collection.
    pub fn resolve<D, K>(&self, partition: Option<&str>) -> RepositoryResult<Collection<D, K>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let name = self.collection_name::<D, K>(partition)?;
        let handle = self.database()?.collection(&name)?;
        Ok(Collection::new(handle))
    }

    /// Returns the collection a document instance belongs to, using its
    /// partition key when the type is partitioned.
    pub fn resolve_for<D, K>(&self, document: &D) -> RepositoryResult<Collection<D, K>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.resolve::<D, K>(partition_of::<D, K>(document))
    }

    /// Returns the physical collection name without touching the database.
    pub fn collection_name<D, K>(&self, partition: Option<&str>) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let canonical_name = self.canonical_name::<D, K>()?;
        collection_name(&canonical_name, partition)
    }

    /// Returns the canonical collection name of `D`: the configured override
    /// if any, otherwise the name the type declares.
    pub fn canonical_name<D, K>(&self) -> RepositoryResult<String>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.bind_key::<D, K>()?;
        let name = self
            .inner
            .config
            .collection_name_for(TypeId::of::<D>())
            .unwrap_or_else(<D as Document<K>>::collection_name);
        validate_canonical_name(&name)?;
        Ok(name)
    }

    /// Drops the collection of `D` in `partition`.
    pub fn drop_collection<D, K>(&self, partition: Option<&str>) -> RepositoryResult<()>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let name = self.collection_name::<D, K>(partition)?;
        self.database()?.drop_collection(&name)
    }

    /// Lists the partitions of `D` that currently have a collection.
    pub fn partitions<D, K>(&self) -> RepositoryResult<Vec<String>>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        let canonical_name = self.canonical_name::<D, K>()?;
        let names = self.database()?.list_collection_names()?;
        Ok(names
            .iter()
            .filter_map(|name| match split_collection_name(name) {
                (canonical, Some(partition)) if canonical == canonical_name => {
                    Some(partition.to_string())
                }
                _ => None,
            })
            .collect())
    }

    fn bind_key<D: 'static, K: 'static>(&self) -> RepositoryResult<()> {
        let document_type = TypeId::of::<D>();
        let requested = KeyBinding::of::<K>();

        if let Some(binding) = self.inner.key_bindings.get(&document_type) {
            return binding.check::<D>(&requested);
        }

        let binding = self
            .inner
            .key_bindings
            .entry(document_type)
            .or_insert(requested.clone());
        binding.check::<D>(&requested)
    }
}

impl Debug for CollectionResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionResolver")
            .field("bound_types", &self.inner.key_bindings.len())
            .finish()
    }
}

struct CollectionResolverInner {
    config: RepositoryConfig,
    key_bindings: DashMap<TypeId, KeyBinding>,
}

#[derive(Clone)]
struct KeyBinding {
    key_type: TypeId,
    key_type_name: &'static str,
}

impl KeyBinding {
    fn of<K: 'static>() -> Self {
        KeyBinding {
            key_type: TypeId::of::<K>(),
            key_type_name: type_name::<K>(),
        }
    }

    fn check<D>(&self, requested: &KeyBinding) -> RepositoryResult<()> {
        if self.key_type == requested.key_type {
            return Ok(());
        }

        log::error!(
            "{} is bound to key type {}, cannot use it with {}",
            type_name::<D>(),
            self.key_type_name,
            requested.key_type_name
        );
        Err(RepositoryError::new(
            &format!(
                "Document type {} uses key type {}, not {}",
                type_name::<D>(),
                self.key_type_name,
                requested.key_type_name
            ),
            ErrorKind::KeyTypeMismatch,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PartitionedDocument;
    use crate::driver::memory::InMemoryDatabase;
    use crate::driver::{all, DatabaseProvider, FindOptions};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Clone, Default, Serialize, Deserialize)]
    struct Order {
        id: Uuid,
        tenant: Option<String>,
    }

    impl Document for Order {
        fn id(&self) -> &Uuid {
            &self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }

        fn as_partitioned(&self) -> Option<&dyn PartitionedDocument> {
            Some(self)
        }
    }

    impl PartitionedDocument for Order {
        fn partition_key(&self) -> Option<&str> {
            self.tenant.as_deref()
        }
    }

    // same type, second key type
    impl Document<String> for Order {
        fn id(&self) -> &String {
            unimplemented!()
        }

        fn set_id(&mut self, _id: String) {}
    }

    #[derive(Clone, Default, Serialize, Deserialize)]
    struct BadName {
        id: Uuid,
    }

    impl Document for BadName {
        fn id(&self) -> &Uuid {
            &self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }

        fn collection_name() -> String {
            "bad-name".to_string()
        }
    }

    fn resolver() -> CollectionResolver {
        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("shop")))
            .unwrap();
        CollectionResolver::new(config)
    }

    #[test]
    fn test_resolve_partitioned_and_default() {
        let resolver = resolver();
        let partitioned = resolver.resolve::<Order, Uuid>(Some("tenantA")).unwrap();
        let default = resolver.resolve::<Order, Uuid>(None).unwrap();
        assert_eq!(partitioned.name(), "Order-tenantA");
        assert_eq!(default.name(), "Order");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = resolver();
        let first = resolver.resolve::<Order, Uuid>(Some("tenantA")).unwrap();
        let second = resolver.resolve::<Order, Uuid>(Some("tenantA")).unwrap();
        assert!(first.same_collection(&second));
    }

    #[test]
    fn test_empty_partition_is_default() {
        let resolver = resolver();
        let empty = resolver.resolve::<Order, Uuid>(Some("")).unwrap();
        let none = resolver.resolve::<Order, Uuid>(None).unwrap();
        assert!(empty.same_collection(&none));
    }

    #[test]
    fn test_resolve_for_instance() {
        let resolver = resolver();
        let order = Order {
            id: Uuid::new_v4(),
            tenant: Some("tenantB".to_string()),
        };
        let collection = resolver.resolve_for::<Order, Uuid>(&order).unwrap();
        assert_eq!(collection.name(), "Order-tenantB");
    }

    #[test]
    fn test_configured_name_wins() {
        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("shop")))
            .unwrap();
        config.set_collection_name::<Order>("orders").unwrap();
        let resolver = CollectionResolver::new(config);
        assert_eq!(
            resolver.collection_name::<Order, Uuid>(Some("eu")).unwrap(),
            "orders-eu"
        );
    }

    #[test]
    fn test_invalid_declared_name() {
        let resolver = resolver();
        let error = resolver.resolve::<BadName, Uuid>(None).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidCollectionName);
    }

    #[test]
    fn test_key_type_mismatch() {
        let first = resolver();
        first.resolve::<Order, Uuid>(None).unwrap();
        let error = first.resolve::<Order, String>(None).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::KeyTypeMismatch);

        // a separate repository has its own ledger
        let other = resolver();
        assert!(other.resolve::<Order, String>(None).is_ok());
    }

    #[test]
    fn test_debug_reports_bound_types() {
        let resolver = resolver();
        resolver.collection_name::<Order, Uuid>(None).unwrap();
        assert_eq!(
            format!("{:?}", resolver),
            "CollectionResolver { bound_types: 1 }"
        );
    }

    #[test]
    fn test_closed_database_propagates() {
        let resolver = resolver();
        resolver.database().unwrap().close().unwrap();
        let error = resolver.resolve::<Order, Uuid>(None).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::StoreAlreadyClosed);
    }

    fn order(tenant: Option<&str>) -> Order {
        Order {
            id: Uuid::new_v4(),
            tenant: tenant.map(str::to_string),
        }
    }

    #[test]
    fn test_drop_collection_and_partitions() {
        let resolver = resolver();
        for tenant in [None, Some("tenantA"), Some("tenantB")] {
            resolver
                .resolve::<Order, Uuid>(tenant)
                .unwrap()
                .insert_one(&order(tenant))
                .unwrap();
        }
        assert_eq!(
            resolver.partitions::<Order, Uuid>().unwrap(),
            vec!["tenantA", "tenantB"]
        );

        resolver.drop_collection::<Order, Uuid>(Some("tenantA")).unwrap();
        assert_eq!(resolver.partitions::<Order, Uuid>().unwrap(), vec!["tenantB"]);
    }

    #[test]
    fn test_resolution_leaves_database_untouched() {
        let resolver = resolver();
        resolver
            .resolve::<Order, Uuid>(Some("tenantA"))
            .unwrap()
            .insert_one(&order(Some("tenantA")))
            .unwrap();

        let ghost = resolver.resolve::<Order, Uuid>(Some("ghost")).unwrap();
        assert_eq!(ghost.count(&all()).unwrap(), 0);
        assert!(ghost.find(&all(), &FindOptions::new()).unwrap().is_empty());
        resolver.resolve::<Order, Uuid>(None).unwrap();

        assert_eq!(resolver.partitions::<Order, Uuid>().unwrap(), vec!["tenantA"]);
        assert_eq!(
            resolver.database().unwrap().list_collection_names().unwrap(),
            vec!["Order-tenantA"]
        );
    }
}
