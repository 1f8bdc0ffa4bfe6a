//! Tests for the database aggregate: connection lifecycle and
//! version-gated collection composition

use super::*;
use crate::testing::{
    connect_with_progress, connected_database, name_rows, unconnected_database, FakeServer,
};
use flint_core::keys;
use flint_core::{CountingProgress, NullProgress, Row};

fn collection_kinds(db: &Arc<Database>) -> Vec<ObjectKind> {
    db.container()
        .collections()
        .iter()
        .map(|c| c.kind())
        .collect()
}

mod connect_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_builds_model_and_reports_state() {
        let server = FakeServer::with_ods(11, 2);
        server.on(
            "rdb$relation_type is null or rdb$relation_type in (0, 2)",
            name_rows(&["EMPLOYEE"]),
        );
        let db = unconnected_database(&server);
        assert_eq!(db.state(), ConnectionState::Disconnected);

        db.connect(Some("masterkey"), &NullProgress).await.unwrap();
        assert_eq!(db.state(), ConnectionState::Connected);
        assert!(db.is_connected());
        assert!(db.server_info().is_ok());
        assert_eq!(db.collection(ObjectKind::Tables).unwrap().len(), 1);

        // connecting again is a no-op: no second session
        db.connect(Some("masterkey"), &NullProgress).await.unwrap();
        assert_eq!(server.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_rolls_back_to_disconnected() {
        let server = FakeServer::with_ods(11, 2);
        server.set_fail_connect(true);
        let (db, result) = connect_with_progress(&server, &NullProgress).await;
        assert!(matches!(result, Err(FlintError::Connection(_))));
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(db.loader().is_err());
    }

    #[tokio::test]
    async fn test_load_failure_after_handshake_rolls_back() {
        let server = FakeServer::with_ods(11, 2);
        server.fail_query("from rdb$database", "metadata table unreadable");
        let (db, result) = connect_with_progress(&server, &NullProgress).await;
        assert!(matches!(result, Err(FlintError::Query(_))));
        assert_eq!(db.state(), ConnectionState::Disconnected);
        // the half-opened session was released
        assert!(server.last_session().unwrap().is_closed());
    }

    #[tokio::test]
    async fn test_cancel_during_handshake_discards_stray_session() {
        let server = FakeServer::with_ods(11, 2);
        server.set_connect_delay(std::time::Duration::from_millis(250));
        // cancel on the first poll tick
        let progress = CountingProgress::cancel_after(1);
        let (db, result) = connect_with_progress(&server, &progress).await;

        assert!(matches!(result, Err(FlintError::Canceled)));
        assert_eq!(db.state(), ConnectionState::Disconnected);
        // the handshake was still in flight when we gave up
        assert!(server.sessions().is_empty());

        // let the background attempt finish; its session must be
        // force-closed by the drain task, not applied
        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        let stray = server.last_session().expect("handshake completed late");
        assert!(stray.is_closed());
        assert!(db.loader().is_err());
    }

    #[tokio::test]
    async fn test_cancel_during_collection_load_rolls_back() {
        let server = FakeServer::with_ods(11, 2);
        server.on(
            "rdb$relation_type is null or rdb$relation_type in (0, 2)",
            name_rows(&["A", "B", "C"]),
        );
        // the handshake takes one poll tick; the rest of the steps come
        // from collection loads, so this cancels partway through the batch
        let progress = CountingProgress::cancel_after(10);
        let (db, result) = connect_with_progress(&server, &progress).await;
        assert!(matches!(result, Err(FlintError::Canceled)));
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(server.last_session().unwrap().is_closed());
    }

    #[tokio::test]
    async fn test_disconnect_clears_cached_model() {
        let server = FakeServer::with_ods(11, 2);
        server.on(
            "rdb$relation_type is null or rdb$relation_type in (0, 2)",
            name_rows(&["EMPLOYEE"]),
        );
        let db = connected_database(&server).await;
        db.prepare_temporary_credentials();

        db.disconnect().await.unwrap();
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(db.container().is_empty());
        assert!(db.server_info().is_err());
        assert!(!db.root().properties_loaded());
        assert!(server.last_session().unwrap().is_closed());

        // disconnecting again is a no-op
        db.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_transaction_spans_initial_load() {
        let server = FakeServer::with_ods(11, 2);
        server.on(
            "rdb$relation_type is null or rdb$relation_type in (0, 2)",
            name_rows(&["EMPLOYEE"]),
        );
        let db = connected_database(&server).await;
        let session = server.last_session().unwrap();
        // one outer transaction covered info, properties and every
        // collection load
        assert_eq!(session.begin_count(), 1);
        assert_eq!(session.commit_count(), 1);
        assert!(session.query_count() > 1);
        drop(db);
    }
}

mod composition_tests {
    use super::*;

    #[tokio::test]
    async fn test_ods_11_0_omits_gated_collections() {
        let server = FakeServer::with_ods(11, 0);
        let db = connected_database(&server).await;
        let kinds = collection_kinds(&db);
        assert!(!kinds.contains(&ObjectKind::DbTriggers));
        assert!(!kinds.contains(&ObjectKind::DdlTriggers));
        assert!(!kinds.contains(&ObjectKind::Packages));
        assert!(!kinds.contains(&ObjectKind::SystemPackages));
        assert!(!kinds.contains(&ObjectKind::Functions));
        assert!(!kinds.contains(&ObjectKind::GlobalTemporaryTables));
        assert!(!kinds.contains(&ObjectKind::SystemRoles));
        // the ungated baseline is present
        assert!(kinds.contains(&ObjectKind::Tables));
        assert!(kinds.contains(&ObjectKind::Views));
        assert!(kinds.contains(&ObjectKind::DmlTriggers));
        assert!(kinds.contains(&ObjectKind::Domains));
        assert!(kinds.contains(&ObjectKind::Users));
    }

    #[tokio::test]
    async fn test_ods_11_1_adds_db_triggers_and_gtts() {
        let server = FakeServer::with_ods(11, 1);
        let db = connected_database(&server).await;
        let kinds = collection_kinds(&db);
        assert!(kinds.contains(&ObjectKind::DbTriggers));
        assert!(kinds.contains(&ObjectKind::GlobalTemporaryTables));
        assert!(kinds.contains(&ObjectKind::SystemRoles));
        assert!(!kinds.contains(&ObjectKind::DdlTriggers));
        assert!(!kinds.contains(&ObjectKind::Packages));
    }

    #[tokio::test]
    async fn test_ods_12_0_adds_ddl_triggers_and_packages() {
        let server = FakeServer::with_ods(12, 0);
        server.on("from sec$users", name_rows(&["SYSDBA"]));
        let db = connected_database(&server).await;
        let kinds = collection_kinds(&db);
        assert!(kinds.contains(&ObjectKind::DbTriggers));
        assert!(kinds.contains(&ObjectKind::DdlTriggers));
        assert!(kinds.contains(&ObjectKind::Packages));
        assert!(kinds.contains(&ObjectKind::SystemPackages));
        assert!(kinds.contains(&ObjectKind::Functions));
        // users came from the security database
        let users = db.collection(ObjectKind::Users).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.items()[0].name().get(), "SYSDBA");
    }

    #[tokio::test]
    async fn test_ods_14_0_nests_collections_under_schemas() {
        let server = FakeServer::with_ods(14, 0);
        server.on("order by rdb$schema_name", name_rows(&["PUBLIC", "SYSTEM"]));
        server.on_param(
            "where rdb$schema_name = ?",
            "PUBLIC",
            vec![Row::new(vec![
                Value::from("PUBLIC"),
                Value::from("UTF8"),
                Value::from("SYSTEM"),
                Value::Null,
                Value::Int32(0),
                Value::Null,
            ])],
        );
        server.on_param(
            "where rdb$schema_name = ?",
            "SYSTEM",
            vec![Row::new(vec![
                Value::from("SYSTEM"),
                Value::from("UTF8"),
                Value::from("SYSTEM"),
                Value::Null,
                Value::Int32(1),
                Value::Null,
            ])],
        );
        let db = connected_database(&server).await;

        let kinds = collection_kinds(&db);
        // top level shrinks to roles, users and the schema list
        assert!(kinds.contains(&ObjectKind::Schemas));
        assert!(kinds.contains(&ObjectKind::Roles));
        assert!(kinds.contains(&ObjectKind::Users));
        assert!(!kinds.contains(&ObjectKind::Tables));
        assert!(!kinds.contains(&ObjectKind::Views));
        assert!(!kinds.contains(&ObjectKind::Domains));

        let schemas = db.collection(ObjectKind::Schemas).unwrap();
        let public = schemas.find_by_name("PUBLIC").unwrap();
        assert!(!public.is_system());
        let nested = crate::schema::container(&public).expect("nested container");
        assert!(nested.collection(ObjectKind::Tables).is_some());
        assert!(nested.collection(ObjectKind::Views).is_some());

        let system = schemas.find_by_name("SYSTEM").unwrap();
        assert!(system.is_system());
        let nested_sys = crate::schema::container(&system).expect("nested container");
        assert!(nested_sys.collection(ObjectKind::SystemTables).is_some());
        assert!(nested_sys.collection(ObjectKind::Tables).is_none());
    }

    #[tokio::test]
    async fn test_system_visibility_settings_consulted_at_composition() {
        let server = FakeServer::with_ods(11, 2);
        let db = unconnected_database(&server);
        db.settings()
            .set_for_database(&db.id().to_string(), keys::SHOW_SYSTEM_TABLES, false);
        db.settings()
            .set_for_database(&db.id().to_string(), keys::SHOW_SYSTEM_DOMAINS, false);
        db.connect(Some("masterkey"), &NullProgress).await.unwrap();

        let kinds = collection_kinds(&db);
        assert!(!kinds.contains(&ObjectKind::SystemTables));
        assert!(!kinds.contains(&ObjectKind::SystemDomains));
        assert!(kinds.contains(&ObjectKind::SystemIndices));
        assert!(kinds.contains(&ObjectKind::Tables));
    }

    #[tokio::test]
    async fn test_one_node_indices_folds_system_indices() {
        let server = FakeServer::with_ods(11, 2);
        let db = unconnected_database(&server);
        db.settings()
            .set_for_database(&db.id().to_string(), keys::SHOW_ONE_NODE_INDICES, true);
        db.connect(Some("masterkey"), &NullProgress).await.unwrap();

        let kinds = collection_kinds(&db);
        assert!(kinds.contains(&ObjectKind::Indices));
        assert!(!kinds.contains(&ObjectKind::SystemIndices));
    }

    #[tokio::test]
    async fn test_registration_order_is_deterministic() {
        let server = FakeServer::with_ods(11, 2);
        let first = collection_kinds(&connected_database(&server).await);
        let second = collection_kinds(&connected_database(&server).await);
        assert_eq!(first, second);
        // character sets lead, views close the list
        assert_eq!(first.first(), Some(&ObjectKind::CharacterSets));
        assert_eq!(first.last(), Some(&ObjectKind::Views));
    }
}

mod properties_tests {
    use super::*;

    #[tokio::test]
    async fn test_database_properties_with_version_gated_columns() {
        let server = FakeServer::with_ods(13, 0);
        server.on("from sec$users", name_rows(&["SYSDBA"]));
        server.on(
            "from rdb$database",
            vec![Row::new(vec![
                Value::from("UTF8"),
                Value::from("SYSDBA"),
                Value::from("NONE"),
                Value::Int32(30),
                Value::Bool(true),
            ])],
        );
        let db = connected_database(&server).await;
        let props = db.database_properties();
        assert_eq!(props.default_charset.as_deref(), Some("UTF8"));
        assert_eq!(props.connection_user.as_deref(), Some("SYSDBA"));
        // role NONE reads as no role
        assert!(props.connection_role.is_none());
        assert_eq!(props.linger, 30);
        assert_eq!(props.sql_security.as_deref(), Some("SQL SECURITY DEFINER"));
    }

    #[tokio::test]
    async fn test_timezones_loaded_on_ods_13() {
        let server = FakeServer::with_ods(13, 0);
        server.on("from sec$users", name_rows(&["SYSDBA"]));
        server.on(
            "from rdb$time_zones",
            vec![
                Row::new(vec![Value::Int32(65535), Value::from("GMT")]),
                Row::new(vec![Value::Int32(65019), Value::from("Europe/Zagreb")]),
            ],
        );
        server.on(
            "rdb$get_context",
            vec![Row::new(vec![Value::Int32(65019), Value::from("Europe/Zagreb")])],
        );
        let db = connected_database(&server).await;
        assert_eq!(db.default_timezone().unwrap().name, "Europe/Zagreb");
        assert_eq!(db.timezone_name(65535), "GMT");
        assert_eq!(db.timezone_name(1), "TZ 1");
    }

    #[tokio::test]
    async fn test_timezones_skipped_below_ods_13() {
        let server = FakeServer::with_ods(12, 0);
        server.on("from sec$users", name_rows(&["SYSDBA"]));
        let db = connected_database(&server).await;
        assert!(db.default_timezone().is_none());
        let session = server.last_session().unwrap();
        assert!(!session
            .query_log()
            .iter()
            .any(|sql| sql.contains("rdb$time_zones")));
    }

    #[tokio::test]
    async fn test_server_info_staleness_window() {
        let server = FakeServer::with_ods(11, 2);
        let db = connected_database(&server).await;
        let session = server.last_session().unwrap();
        let calls = session.info_call_count();

        // fresh snapshot: served from cache
        db.refreshed_server_info().await.unwrap();
        assert_eq!(session.info_call_count(), calls);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        db.refreshed_server_info().await.unwrap();
        assert_eq!(session.info_call_count(), calls + 1);
    }

    #[tokio::test]
    async fn test_generator_values_bulk_reload() {
        let server = FakeServer::with_ods(11, 2);
        server.on("from rdb$generators", name_rows(&["G1", "G2"]));
        server.on("select gen_id(", vec![Row::new(vec![Value::Int64(7)])]);
        let db = connected_database(&server).await;

        db.load_generator_values().await.unwrap();
        let generators = db.collection(ObjectKind::Generators).unwrap();
        for item in generators.items() {
            assert!(item.properties_loaded());
            assert_eq!(crate::generator::value(&item), Some(7));
        }
    }

    #[tokio::test]
    async fn test_relation_name_for_index() {
        let server = FakeServer::with_ods(11, 2);
        server.on_param(
            "from rdb$indices where rdb$index_name",
            "IDX1",
            vec![Row::new(vec![Value::from("EMPLOYEE  ")])],
        );
        let db = connected_database(&server).await;
        let relation = db.relation_name_for_index("IDX1").await.unwrap();
        assert_eq!(relation.unwrap().get(), "EMPLOYEE");
        assert!(db.relation_name_for_index("MISSING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_requires_connection() {
        let server = FakeServer::with_ods(11, 2);
        let db = unconnected_database(&server);
        assert!(db.find_by_kind_and_name(ObjectKind::Table, "T1").is_none());
        assert!(db.check_connected("anything").is_err());
    }

    #[tokio::test]
    async fn test_charset_lookup_by_id_and_default_collation() {
        let server = FakeServer::with_ods(11, 2);
        server.on("from rdb$character_sets order by 1", name_rows(&["UTF8"]));
        server.on_param(
            "from rdb$character_sets where rdb$character_set_name",
            "UTF8",
            vec![Row::new(vec![
                Value::Int32(4),
                Value::Int32(4),
                Value::from("UNICODE"),
            ])],
        );
        server.on(
            "from rdb$collations \
               where rdb$character_set_id",
            name_rows(&["UNICODE", "UNICODE_CI"]),
        );
        let db = connected_database(&server).await;

        assert!(db.is_default_collation("UTF8", "UNICODE").await.unwrap());
        assert!(!db.is_default_collation("UTF8", "UNICODE_CI").await.unwrap());

        let names = db.collations_for_charset("UTF8").await.unwrap();
        assert_eq!(names.len(), 2);

        // a column-level id packs collation in the high byte
        let charset = db.charset_by_id(4 + 256).unwrap();
        assert_eq!(charset.name().get(), "UTF8");
    }

    #[tokio::test]
    async fn test_find_by_name_scans_all_collections() {
        let server = FakeServer::with_ods(11, 2);
        server.on("from rdb$generators", name_rows(&["GEN_X"]));
        let db = connected_database(&server).await;
        let found = db.find_by_name("GEN_X").unwrap();
        assert_eq!(found.kind(), ObjectKind::Generator);
        assert!(db.find_by_name("NOPE").is_none());
    }

    #[tokio::test]
    async fn test_database_kind_resolves_to_root() {
        let server = FakeServer::with_ods(11, 2);
        let db = connected_database(&server).await;
        let found = db
            .find_by_kind_and_name(ObjectKind::Database, "whatever")
            .unwrap();
        assert!(Arc::ptr_eq(&found, db.root()));
    }
}
