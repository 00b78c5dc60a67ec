use docrepo::collection::split_collection_name;
use docrepo::driver::memory::InMemoryDatabase;
use docrepo::driver::{all, Database};
use docrepo::errors::ErrorKind;
use docrepo::{Document, ReadOperations, Repository};
use docrepo_derive::Document;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Debug, Clone, PartialEq, Document, Serialize, Deserialize)]
#[document(partition = "tenant")]
pub struct Order {
    pub id: Uuid,
    pub tenant: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Document, Serialize, Deserialize)]
#[document(name = "audit_log")]
pub struct AuditEntry {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Document, Serialize, Deserialize)]
#[document(key = "code")]
pub struct Currency {
    pub code: String,
    pub symbol: String,
}

fn order(tenant: Option<&str>, total: f64) -> Order {
    Order {
        id: Uuid::nil(),
        tenant: tenant.map(str::to_string),
        total,
    }
}

#[test]
fn test_partitioned_collection_names() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            assert_eq!(
                repository.collection_name::<Order>(Some("tenantA"))?,
                "Order-tenantA"
            );
            assert_eq!(repository.collection_name::<Order>(None)?, "Order");
            assert_eq!(repository.collection_name::<Order>(Some(""))?, "Order");
            assert_eq!(
                repository.collection_name::<AuditEntry>(Some("2024"))?,
                "audit_log-2024"
            );
            assert_eq!(
                repository.keyed::<String>().collection_name::<Currency>(None)?,
                "Currency"
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_resolution_is_deterministic() {
    run_test(
        create_test_context,
        |ctx| {
            let resolver = ctx.repository().resolver().clone();
            let first = resolver.resolve::<Order, Uuid>(Some("tenantA"))?;
            let second = resolver.resolve::<Order, Uuid>(Some("tenantA"))?;
            assert!(first.same_collection(&second));
            assert_eq!(first.name(), second.name());

            let other = resolver.resolve::<Order, Uuid>(Some("tenantB"))?;
            assert!(!first.same_collection(&other));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_partitions_are_isolated() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let mut a = order(Some("tenantA"), 10.0);
            let mut b = order(Some("tenantB"), 20.0);
            let mut unpartitioned = order(None, 30.0);
            repository.add_one(&mut a)?;
            repository.add_one(&mut b)?;
            repository.add_one(&mut unpartitioned)?;

            assert_eq!(repository.count::<Order>(&all(), Some("tenantA"))?, 1);
            assert_eq!(repository.count::<Order>(&all(), Some("tenantB"))?, 1);
            assert_eq!(repository.count::<Order>(&all(), None)?, 1);

            assert_eq!(repository.get_by_id::<Order>(&a.id, Some("tenantA"))?, Some(a.clone()));
            assert_eq!(repository.get_by_id::<Order>(&a.id, Some("tenantB"))?, None);
            assert_eq!(repository.get_by_id::<Order>(&a.id, None)?, None);

            let names = ctx.database().list_collection_names()?;
            assert_eq!(names, vec!["Order", "Order-tenantA", "Order-tenantB"]);
            for name in &names {
                assert_eq!(split_collection_name(name).0, "Order");
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_partition_equals_none() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let mut blank = order(Some(""), 5.0);
            repository.add_one(&mut blank)?;

            assert_eq!(repository.count::<Order>(&all(), None)?, 1);
            assert_eq!(repository.count::<Order>(&all(), Some(""))?, 1);
            assert_eq!(repository.get_by_id::<Order>(&blank.id, None)?, Some(blank));
            assert!(repository.partitions::<Order>()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_partitions_listing_and_drop() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            for tenant in ["tenantC", "tenantA", "tenantB"] {
                repository.add_one(&mut order(Some(tenant), 1.0))?;
            }
            repository.add_one(&mut order(None, 1.0))?;
            assert_eq!(
                repository.partitions::<Order>()?,
                vec!["tenantA", "tenantB", "tenantC"]
            );

            repository.drop_collection::<Order>(Some("tenantB"))?;
            assert_eq!(repository.partitions::<Order>()?, vec!["tenantA", "tenantC"]);
            assert_eq!(repository.count::<Order>(&all(), Some("tenantB"))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reads_do_not_create_partitions() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.add_one(&mut order(Some("tenantA"), 1.0))?;

            assert_eq!(repository.count::<Order>(&all(), Some("ghost"))?, 0);
            assert!(!repository.any::<Order>(&all(), Some("ghost"))?);
            assert!(repository.get_all::<Order>(Some("ghost"))?.is_empty());
            assert_eq!(repository.get_index_names::<Order>(Some("ghost"))?.len(), 1);
            assert_eq!(repository.delete_many::<Order>(&all(), Some("ghost"))?, 0);

            assert_eq!(repository.partitions::<Order>()?, vec!["tenantA"]);
            assert_eq!(ctx.database().list_collection_names()?, vec!["Order-tenantA"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mixed_key_types_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.keyed::<u64>().collection_name::<Counter>(None)?;

            let mismatch = repository.collection_name::<Counter>(None).unwrap_err();
            assert_eq!(mismatch.kind(), &ErrorKind::KeyTypeMismatch);

            // the first binding stays valid
            assert_eq!(
                repository.keyed::<u64>().count::<Counter>(&all(), None)?,
                0
            );
            Ok(())
        },
        cleanup,
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    pub id: Uuid,
    pub seq: u64,
}

impl Document for Counter {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Document<u64> for Counter {
    fn id(&self) -> &u64 {
        &self.seq
    }

    fn set_id(&mut self, id: u64) {
        self.seq = id;
    }
}

#[test]
fn test_collection_name_override() {
    let repository = Repository::builder()
        .database(Database::new(InMemoryDatabase::new("override")))
        .collection_name::<Order>("orders")
        .open()
        .unwrap();
    assert_eq!(
        repository.collection_name::<Order>(Some("tenantA")).unwrap(),
        "orders-tenantA"
    );
    repository.add_one(&mut order(Some("tenantA"), 1.0)).unwrap();
    assert_eq!(repository.partitions::<Order>().unwrap(), vec!["tenantA"]);
}

#[test]
fn test_partition_values_are_free_form() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            assert_eq!(
                repository.collection_name::<Order>(Some("eu-west"))?,
                "Order-eu-west"
            );
            repository.add_one(&mut order(Some("eu-west"), 1.0))?;
            assert_eq!(repository.partitions::<Order>()?, vec!["eu-west"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reserved_canonical_name_rejected() {
    let error = Repository::builder()
        .database(Database::new(InMemoryDatabase::new("reserved")))
        .collection_name::<Order>("$orders")
        .open()
        .unwrap_err();
    assert_eq!(error.kind(), &ErrorKind::InvalidCollectionName);
}
