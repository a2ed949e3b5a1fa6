use planpal_core::{Contact, ListEntity, RecordError};
use uuid::Uuid;

#[test]
fn new_contact_has_fresh_id_and_no_categories() {
    let first = Contact::new("Alice");
    let second = Contact::new("Alice");
    assert!(!first.id.is_nil());
    assert_ne!(first.id, second.id);
    assert!(first.categories.is_empty());
    assert_eq!(first.phone, None);
}

#[test]
fn contact_serialization_uses_expected_fields() {
    let mut contact = Contact::parse("Alice /phone:123").unwrap();
    contact.id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    contact.categories.insert("friend");

    let json = serde_json::to_value(&contact).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["phone"], "123");
    assert!(json["email"].is_null());
    assert_eq!(json["categories"], serde_json::json!(["friend"]));

    let back: Contact = serde_json::from_value(json).unwrap();
    assert_eq!(back, contact);
}

#[test]
fn storage_form_survives_edits() {
    let mut contact = Contact::parse("Alice").unwrap();
    contact.apply_edit("phone:999 /name:Alicia").unwrap();
    let stored = contact.storage_description();
    assert_eq!(stored, "name:Alicia /phone:999");
    assert_eq!(Contact::parse(&stored).unwrap().storage_description(), stored);
}

#[test]
fn edit_with_bad_segment_changes_nothing() {
    let mut contact = Contact::parse("Alice /phone:1").unwrap();
    let before = contact.clone();
    assert_eq!(
        contact.apply_edit("phone:2 /nickname:Al"),
        Err(RecordError::UnknownField("nickname".to_string()))
    );
    assert_eq!(contact, before);
}
