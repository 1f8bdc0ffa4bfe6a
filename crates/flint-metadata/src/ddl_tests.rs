//! Tests for DDL text generation

use super::*;
use crate::identifier::Identifier;
use crate::relation::{ColumnProps, RelationProps};
use crate::trigger::TriggerProps;

fn column(name: &str, source: &str, datatype: &str, not_null: bool) -> Arc<MetadataItem> {
    let item = MetadataItem::new(ObjectKind::Column, Identifier::new(name));
    item.with_properties_mut(|props| {
        *props = Properties::Column(ColumnProps {
            source: Some(Identifier::new(source)),
            not_null,
            default_source: None,
            datatype: datatype.to_string(),
        });
    });
    item.set_properties_loaded(true);
    item
}

fn table_with_columns() -> Arc<MetadataItem> {
    let table = MetadataItem::new(ObjectKind::Table, Identifier::new("EMPLOYEE"));
    table.with_properties_mut(|props| {
        *props = Properties::Relation(RelationProps {
            columns: vec![
                column("ID", "RDB$1", "INTEGER", true),
                column("FULL_NAME", "D_NAME", "VARCHAR(60)", false),
            ],
            ..RelationProps::default()
        });
    });
    table
}

#[test]
fn test_create_table_renders_columns() {
    let ddl = create_ddl(&table_with_columns());
    assert_eq!(
        ddl,
        "CREATE TABLE EMPLOYEE (\n  ID INTEGER NOT NULL,\n  FULL_NAME D_NAME\n);\n"
    );
}

#[test]
fn test_system_backed_column_expands_datatype_user_domain_by_name() {
    let ddl = create_ddl(&table_with_columns());
    // RDB$1 is auto-created, so the rendered type appears instead
    assert!(ddl.contains("ID INTEGER"));
    assert!(!ddl.contains("RDB$1"));
    // D_NAME is a user domain and is referenced by name
    assert!(ddl.contains("FULL_NAME D_NAME"));
}

#[test]
fn test_create_trigger_wraps_in_terminator_block() {
    let item = MetadataItem::new(ObjectKind::DmlTrigger, Identifier::new("CHECK_SALARY"));
    item.with_properties_mut(|props| {
        *props = Properties::Trigger(TriggerProps {
            relation_name: Some(Identifier::new("EMPLOYEE")),
            position: 2,
            active: true,
            trigger_type: 1,
            source: "begin end".to_string(),
            ..TriggerProps::default()
        });
    });
    let ddl = create_ddl(&item);
    assert!(ddl.starts_with("SET TERM ^ ;\n"));
    assert!(ddl.contains("ALTER TRIGGER CHECK_SALARY ACTIVE"));
    // a DML trigger already exists; no CREATE OR prefix
    assert!(!ddl.contains("CREATE OR ALTER TRIGGER"));
    assert!(ddl.contains("BEFORE INSERT POSITION 2"));
    assert!(ddl.ends_with("SET TERM ; ^\n"));
}

#[test]
fn test_database_trigger_uses_create_or_alter() {
    let item = MetadataItem::new(ObjectKind::DbTrigger, Identifier::new("ON_CONNECT"));
    item.with_properties_mut(|props| {
        *props = Properties::Trigger(TriggerProps {
            relation_name: None,
            position: 0,
            active: true,
            trigger_type: 8192,
            source: "begin end".to_string(),
            ..TriggerProps::default()
        });
    });
    let ddl = create_ddl(&item);
    assert!(ddl.contains("CREATE OR ALTER TRIGGER ON_CONNECT"));
    assert!(ddl.contains("ON CONNECT POSITION 0"));
}

#[test]
fn test_create_domain_with_constraints() {
    let item = MetadataItem::new(ObjectKind::Domain, Identifier::new("D_SALARY"));
    item.with_properties_mut(|props| {
        *props = Properties::Domain(crate::domain::DomainProps {
            field_type: 8,
            sub_type: 1,
            length: 4,
            precision: Some(9),
            scale: -2,
            not_null: true,
            default_source: Some("DEFAULT 0".to_string()),
            check_constraint: Some("CHECK (VALUE >= 0)".to_string()),
            ..crate::domain::DomainProps::default()
        });
    });
    let ddl = create_ddl(&item);
    assert_eq!(
        ddl,
        "CREATE DOMAIN D_SALARY AS NUMERIC(9,2)\n  DEFAULT 0\n  NOT NULL\n  CHECK (VALUE >= 0);\n"
    );
}

#[test]
fn test_create_exception_escapes_quotes() {
    let item = MetadataItem::new(ObjectKind::Exception, Identifier::new("E_BAD"));
    item.with_properties_mut(|props| {
        *props = Properties::Exception(crate::exception::ExceptionProps {
            number: 1,
            message: "can't do that".to_string(),
        });
    });
    assert_eq!(
        create_ddl(&item),
        "CREATE EXCEPTION E_BAD 'can''t do that';\n"
    );
}

#[test]
fn test_create_unique_index_with_segments() {
    let item = MetadataItem::new(ObjectKind::Index, Identifier::new("IDX_NAME"));
    item.with_properties_mut(|props| {
        *props = Properties::Index(crate::index::IndexProps {
            relation_name: Some(Identifier::new("EMPLOYEE")),
            unique: true,
            active: true,
            statistics: 0.0,
            segments: vec![Identifier::new("LAST_NAME"), Identifier::new("FIRST_NAME")],
        });
    });
    assert_eq!(
        create_ddl(&item),
        "CREATE UNIQUE INDEX IDX_NAME ON EMPLOYEE (LAST_NAME, FIRST_NAME);\n"
    );
}

#[test]
fn test_generator_and_role_one_liners() {
    let generator = MetadataItem::new(ObjectKind::Generator, Identifier::new("GEN_INV"));
    assert_eq!(create_ddl(&generator), "CREATE SEQUENCE GEN_INV;\n");

    let role = MetadataItem::new(ObjectKind::Role, Identifier::new("MANAGER"));
    assert_eq!(create_ddl(&role), "CREATE ROLE MANAGER;\n");
}

#[test]
fn test_quoted_names_survive_rendering() {
    let generator = MetadataItem::new(ObjectKind::Generator, Identifier::new("mixed case"));
    assert_eq!(create_ddl(&generator), "CREATE SEQUENCE \"mixed case\";\n");
}

#[test]
fn test_collection_kinds_produce_no_ddl() {
    let item = MetadataItem::new(ObjectKind::Database, Identifier::new("DB"));
    assert_eq!(create_ddl(&item), "");
}
