//! Tests for collection loading and reconciliation

use super::*;
use crate::testing::{connected_database, name_rows, unconnected_database, FakeServer};
use flint_core::{CountingProgress, FlintError, NullProgress};

const TABLES_SEED: &str = "rdb$relation_type is null or rdb$relation_type in (0, 2)";

#[tokio::test]
async fn test_load_matches_seed_query_names() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["COUNTRY", "EMPLOYEE", "PROJECT"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    let names: Vec<String> = tables
        .items()
        .iter()
        .map(|t| t.name().get().to_string())
        .collect();
    assert_eq!(names, vec!["COUNTRY", "EMPLOYEE", "PROJECT"]);
}

#[tokio::test]
async fn test_reload_preserves_surviving_items() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["COUNTRY", "EMPLOYEE"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    let employee = tables.find_by_name("EMPLOYEE").unwrap();
    employee.set_properties_loaded(true);

    // COUNTRY vanished, PROJECT appeared, EMPLOYEE persists
    server.on(TABLES_SEED, name_rows(&["EMPLOYEE", "PROJECT"]));
    tables.load(&db, &NullProgress).await.unwrap();

    assert!(tables.find_by_name("COUNTRY").is_none());
    let kept = tables.find_by_name("EMPLOYEE").unwrap();
    // same item, same cached state, no reload
    assert!(Arc::ptr_eq(&kept, &employee));
    assert!(kept.properties_loaded());
    let fresh = tables.find_by_name("PROJECT").unwrap();
    assert!(!fresh.properties_loaded());
}

#[tokio::test]
async fn test_insert_appends_empty_item() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["EMPLOYEE"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    let inserted = tables.insert(Identifier::new("NEWTABLE"));
    assert_eq!(tables.len(), 2);
    assert!(!inserted.properties_loaded());
    assert_eq!(inserted.kind(), ObjectKind::Table);
    // parent wired to the database root
    assert!(Arc::ptr_eq(&inserted.parent().unwrap(), db.root()));
}

#[tokio::test]
async fn test_remove_by_identity() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["A", "B"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    let a = tables.find_by_name("A").unwrap();
    assert!(tables.remove(&a));
    assert_eq!(tables.len(), 1);
    // removing again is a no-op
    assert!(!tables.remove(&a));
}

#[tokio::test]
async fn test_find_by_metadata_id() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["A", "B"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    let b = tables.find_by_name("B").unwrap();
    b.set_metadata_id(Some(129));
    let found = tables.find_by_metadata_id(129).unwrap();
    assert!(Arc::ptr_eq(&found, &b));
    assert!(tables.find_by_metadata_id(999).is_none());
}

#[tokio::test]
async fn test_lookup_misses_return_none() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["A"]));
    let db = connected_database(&server).await;

    let tables = db.collection(ObjectKind::Tables).unwrap();
    assert!(tables.find_by_name("MISSING").is_none());
}

#[tokio::test]
async fn test_load_fails_when_disconnected() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["A"]));
    let db = connected_database(&server).await;
    let tables = db.collection(ObjectKind::Tables).unwrap();

    db.disconnect().await.unwrap();
    let result = tables.load(&db, &NullProgress).await;
    assert!(matches!(result, Err(FlintError::NotConnected(_))));
}

#[tokio::test]
async fn test_canceled_load_leaves_items_untouched() {
    let server = FakeServer::with_ods(11, 2);
    server.on(TABLES_SEED, name_rows(&["A", "B"]));
    let db = connected_database(&server).await;
    let tables = db.collection(ObjectKind::Tables).unwrap();
    assert_eq!(tables.len(), 2);

    let progress = CountingProgress::new();
    progress.cancel();
    let result = tables.load(&db, &progress).await;
    assert!(matches!(result, Err(FlintError::Canceled)));
    // no partial state: the previous item list is intact
    assert_eq!(tables.len(), 2);
}

#[tokio::test]
async fn test_unconnected_database_has_no_collections() {
    let server = FakeServer::with_ods(11, 2);
    let db = unconnected_database(&server);
    assert!(db.collection(ObjectKind::Tables).is_none());
    assert!(db.container().is_empty());
}

#[tokio::test]
async fn test_qualified_title_for_schema_scope() {
    let server = FakeServer::with_ods(11, 2);
    let db = connected_database(&server).await;
    let tables = db.collection(ObjectKind::Tables).unwrap();
    assert_eq!(tables.qualified_title(), "Tables");
    assert_eq!(tables.title(), "Tables");
}
