//! Tests for object kind tags

use super::*;

#[test]
fn test_code_round_trip() {
    for code in 0..200u16 {
        if let Some(kind) = ObjectKind::from_code(code) {
            assert_eq!(kind.code(), code);
        }
    }
    assert_eq!(ObjectKind::Database.code(), 0);
    assert!(ObjectKind::from_code(10_000).is_none());
}

#[test]
fn test_collection_offset_arithmetic() {
    // every item kind except Database maps to the next code, and back
    for code in 0..200u16 {
        let Some(kind) = ObjectKind::from_code(code) else {
            continue;
        };
        if kind == ObjectKind::Database {
            assert!(kind.collection_kind().is_none());
            continue;
        }
        if kind.is_collection() {
            let item = kind.item_kind().expect("collection has item kind");
            assert_eq!(item.collection_kind(), Some(kind));
            assert_eq!(item.code() + 1, kind.code());
        } else {
            let coll = kind.collection_kind().expect("item has collection kind");
            assert!(coll.is_collection());
            assert_eq!(coll.item_kind(), Some(kind));
        }
    }
}

#[test]
fn test_specific_pairs() {
    assert_eq!(ObjectKind::Table.collection_kind(), Some(ObjectKind::Tables));
    assert_eq!(
        ObjectKind::DmlTrigger.collection_kind(),
        Some(ObjectKind::DmlTriggers)
    );
    assert_eq!(
        ObjectKind::SystemDomains.item_kind(),
        Some(ObjectKind::SystemDomain)
    );
    assert_eq!(
        ObjectKind::CharacterSets.item_kind(),
        Some(ObjectKind::CharacterSet)
    );
}

#[test]
fn test_relation_kinds() {
    assert!(ObjectKind::Table.is_relation());
    assert!(ObjectKind::SystemTable.is_relation());
    assert!(ObjectKind::GlobalTemporaryTable.is_relation());
    assert!(ObjectKind::View.is_relation());
    assert!(!ObjectKind::Domain.is_relation());
    assert!(!ObjectKind::Tables.is_relation());
}

#[test]
fn test_system_kinds() {
    assert!(ObjectKind::SystemTable.is_system());
    assert!(ObjectKind::SystemRoles.is_system());
    assert!(!ObjectKind::Table.is_system());
    assert!(!ObjectKind::User.is_system());
}

#[test]
fn test_type_names() {
    assert_eq!(ObjectKind::Database.type_name(), "DATABASE");
    assert_eq!(ObjectKind::DbTriggers.type_name(), "DBTRIGGER_COLLECTION");
    assert_eq!(ObjectKind::Generator.type_name(), "SEQUENCE");
    assert_eq!(ObjectKind::DbTriggers.collection_title(), "Database Triggers");
}
