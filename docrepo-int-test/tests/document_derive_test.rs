use docrepo::document::{partition_of, PartitionedDocument};
use docrepo::Document;
use docrepo_derive::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Document, Serialize, Deserialize)]
pub struct Plain {
    pub id: Uuid,
    pub value: i32,
}

#[derive(Debug, Clone, Default, Document, Serialize, Deserialize)]
#[document(name = "tickets", key = "number", partition = "queue")]
pub struct Ticket {
    pub number: u64,
    pub queue: String,
    pub subject: String,
}

#[derive(Debug, Clone, Default, Document, Serialize, Deserialize)]
#[document(partition = "tenant")]
pub struct Invoice {
    pub id: Uuid,
    pub tenant: Option<String>,
}

#[test]
fn test_plain_document() {
    let mut plain = Plain::default();
    assert!(plain.id().is_nil());
    let id = Uuid::new_v4();
    plain.set_id(id);
    assert_eq!(plain.id, id);
    assert_eq!(<Plain as Document>::collection_name(), "Plain");
    assert!(plain.as_partitioned().is_none());
}

#[test]
fn test_named_document_with_custom_key() {
    let mut ticket = Ticket {
        number: 0,
        queue: "support".to_string(),
        subject: "login".to_string(),
    };
    ticket.set_id(42);
    assert_eq!(*ticket.id(), 42);
    assert_eq!(<Ticket as Document<u64>>::collection_name(), "tickets");
    assert_eq!(ticket.partition_key(), Some("support"));
    assert_eq!(partition_of::<Ticket, u64>(&ticket), Some("support"));

    ticket.queue.clear();
    assert_eq!(partition_of::<Ticket, u64>(&ticket), None);
}

#[test]
fn test_optional_partition_field() {
    let mut invoice = Invoice::default();
    assert_eq!(partition_of::<Invoice, Uuid>(&invoice), None);
    invoice.tenant = Some("acme".to_string());
    assert_eq!(partition_of::<Invoice, Uuid>(&invoice), Some("acme"));
}
