use super::ensure_open;
use crate::collection::CollectionResolver;
use crate::document::{partition_of, Document, DocumentKey};
use crate::driver::WriteResult;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use std::any::type_name;

/// Create capability.
///
/// Documents are written to the collection of their own partition. Keys left
/// at their default value are generated first, unless id generation is
/// switched off in the repository configuration.
#[derive(Debug)]
pub struct CreateAccessor {
    resolver: CollectionResolver,
}

impl CreateAccessor {
    pub fn new(resolver: CollectionResolver) -> RepositoryResult<Self> {
        ensure_open(&resolver, "create")?;
        Ok(CreateAccessor { resolver })
    }

    /// Inserts one document. A generated key is written back into `document`.
    pub fn add_one<D, K>(&self, document: &mut D) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        self.assign_id::<D, K>(document)?;
        self.resolver
            .resolve_for::<D, K>(document)?
            .insert_one(document)
    }

    /// Inserts a batch of documents, one driver call per partition.
    ///
    /// The batch is rejected with `DuplicateId` before anything is written if
    /// two documents share a key. Each partition's insert is atomic on its
    /// own; a failure in a later partition does not undo earlier ones.
    pub fn add_many<D, K>(&self, documents: &mut [D]) -> RepositoryResult<WriteResult>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        if documents.is_empty() {
            return Ok(WriteResult::default());
        }

        for document in documents.iter_mut() {
            self.assign_id::<D, K>(document)?;
        }
        check_distinct_ids::<D, K>(documents)?;

        let mut result = WriteResult::default();
        for (partition, group) in group_by_partition::<D, K>(documents) {
            let collection = self.resolver.resolve::<D, K>(partition.as_deref())?;
            result.merge(collection.insert_many(group)?);
        }
        Ok(result)
    }

    fn assign_id<D, K>(&self, document: &mut D) -> RepositoryResult<()>
    where
        D: Document<K>,
        K: DocumentKey,
    {
        if !document.id().is_unset() || !self.resolver.config().generate_ids() {
            return Ok(());
        }

        match K::generate() {
            Some(id) => {
                document.set_id(id);
                Ok(())
            }
            None => {
                log::error!(
                    "Key of {} is unset and {} keys cannot be generated",
                    type_name::<D>(),
                    type_name::<K>()
                );
                Err(RepositoryError::new(
                    &format!(
                        "Document of type {} has no key and {} keys cannot be generated",
                        type_name::<D>(),
                        type_name::<K>()
                    ),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }
}

// Keys are only `Eq`, so duplicates are found pairwise.
fn check_distinct_ids<D, K>(documents: &[D]) -> RepositoryResult<()>
where
    D: Document<K>,
    K: DocumentKey,
{
    for (position, document) in documents.iter().enumerate() {
        let id = document.id();
        if documents[..position].iter().any(|other| other.id() == id) {
            log::error!("Duplicate key {:?} in batch of {}", id, type_name::<D>());
            return Err(RepositoryError::new(
                &format!("Duplicate key {:?} in batch", id),
                ErrorKind::DuplicateId,
            ));
        }
    }
    Ok(())
}

/// Splits documents by partition, keeping first-seen partition order and the
/// document order inside each partition.
pub(crate) fn group_by_partition<D, K>(documents: &[D]) -> Vec<(Option<String>, Vec<&D>)>
where
    D: Document<K>,
    K: DocumentKey,
{
    let mut groups: Vec<(Option<String>, Vec<&D>)> = Vec::new();
    for document in documents {
        let partition = partition_of::<D, K>(document).map(str::to_string);
        match groups.iter_mut().find(|(key, _)| *key == partition) {
            Some((_, members)) => members.push(document),
            None => groups.push((partition, vec![document])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PartitionedDocument;
    use crate::driver::memory::InMemoryDatabase;
    use crate::driver::{all, Database, DatabaseProvider};
    use crate::repository_config::RepositoryConfig;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: Uuid,
        tenant: String,
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
            Some(&self.tenant)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    struct Sku(String);

    impl DocumentKey for Sku {
        fn generate() -> Option<Self> {
            None
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Item {
        sku: Sku,
    }

    impl Document<Sku> for Item {
        fn id(&self) -> &Sku {
            &self.sku
        }

        fn set_id(&mut self, id: Sku) {
            self.sku = id;
        }
    }

    fn order(tenant: &str) -> Order {
        Order {
            id: Uuid::nil(),
            tenant: tenant.to_string(),
        }
    }

    fn setup(generate_ids: bool) -> (CollectionResolver, CreateAccessor) {
        let config = RepositoryConfig::new();
        config
            .set_database(Database::new(InMemoryDatabase::new("shop")))
            .unwrap();
        config.set_generate_ids(generate_ids).unwrap();
        let resolver = CollectionResolver::new(config);
        let creator = CreateAccessor::new(resolver.clone()).unwrap();
        (resolver, creator)
    }

    #[test]
    fn test_add_one_generates_id() {
        let (resolver, creator) = setup(true);
        let mut order = order("tenantA");
        creator.add_one::<Order, Uuid>(&mut order).unwrap();
        assert!(!order.id.is_nil());

        let collection = resolver.resolve::<Order, Uuid>(Some("tenantA")).unwrap();
        assert_eq!(collection.count(&all()).unwrap(), 1);
    }

    #[test]
    fn test_add_one_keeps_id_when_generation_disabled() {
        let (resolver, creator) = setup(false);
        let mut order = order("");
        creator.add_one::<Order, Uuid>(&mut order).unwrap();
        assert!(order.id.is_nil());
        let collection = resolver.resolve::<Order, Uuid>(None).unwrap();
        assert_eq!(collection.count(&all()).unwrap(), 1);
    }

    #[test]
    fn test_add_one_without_generator_fails() {
        let (_, creator) = setup(true);
        let error = creator
            .add_one::<Item, Sku>(&mut Item::default())
            .unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidId);

        let mut item = Item {
            sku: Sku("pen".to_string()),
        };
        creator.add_one::<Item, Sku>(&mut item).unwrap();
    }

    #[test]
    fn test_add_many_groups_by_partition() {
        let (resolver, creator) = setup(true);
        let mut orders = vec![order("tenantA"), order("tenantB"), order("tenantA"), order("")];
        let result = creator.add_many::<Order, Uuid>(&mut orders).unwrap();
        assert_eq!(result.inserted_count, 4);

        let count = |partition| {
            resolver
                .resolve::<Order, Uuid>(partition)
                .unwrap()
                .count(&all())
                .unwrap()
        };
        assert_eq!(count(Some("tenantA")), 2);
        assert_eq!(count(Some("tenantB")), 1);
        assert_eq!(count(None), 1);
    }

    #[test]
    fn test_add_many_rejects_duplicates_before_writing() {
        let (resolver, creator) = setup(true);
        let id = Uuid::new_v4();
        let mut orders = vec![order("tenantA"), order("tenantB")];
        orders[0].id = id;
        orders[1].id = id;

        let error = creator.add_many::<Order, Uuid>(&mut orders).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DuplicateId);
        assert!(resolver
            .database()
            .unwrap()
            .list_collection_names()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_add_many_empty() {
        let (_, creator) = setup(true);
        let result = creator.add_many::<Order, Uuid>(&mut []).unwrap();
        assert_eq!(result, WriteResult::default());
    }

    #[test]
    fn test_group_by_partition_keeps_order() {
        let orders = vec![order("b"), order("a"), order("b"), order("")];
        let groups = group_by_partition::<Order, Uuid>(&orders);
        let keys = groups.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![Some("b".to_string()), Some("a".to_string()), None]
        );
        assert_eq!(groups[0].1.len(), 2);
    }
}
