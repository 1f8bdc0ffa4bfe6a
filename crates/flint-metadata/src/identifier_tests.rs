//! Tests for identifier normalization and quoting

use super::*;

#[test]
fn test_new_trims_char_padding() {
    let id = Identifier::new("EMPLOYEE   ");
    assert_eq!(id.get(), "EMPLOYEE");
}

#[test]
fn test_from_sql_uppercases_unquoted() {
    assert_eq!(Identifier::from_sql("employee").get(), "EMPLOYEE");
    assert_eq!(Identifier::from_sql("  Emp_2  ").get(), "EMP_2");
}

#[test]
fn test_from_sql_keeps_quoted_spelling() {
    assert_eq!(Identifier::from_sql("\"Mixed Case\"").get(), "Mixed Case");
    assert_eq!(Identifier::from_sql("\"with\"\"quote\"").get(), "with\"quote");
}

#[test]
fn test_lookup_is_case_sensitive_exact() {
    let upper = Identifier::from_sql("employee");
    let mixed = Identifier::from_sql("\"employee\"");
    assert_ne!(upper, mixed);
    assert!(upper.equals("EMPLOYEE"));
    assert!(!upper.equals("employee"));
}

#[test]
fn test_needs_quoting() {
    assert!(!Identifier::new("EMPLOYEE").needs_quoting());
    assert!(!Identifier::new("T_1$X").needs_quoting());
    assert!(Identifier::new("lower").needs_quoting());
    assert!(Identifier::new("Mixed Case").needs_quoting());
    assert!(Identifier::new("1STARTSWITHDIGIT").needs_quoting());
    assert!(!Identifier::new("").needs_quoting());
}

#[test]
fn test_quoted_rendering() {
    assert_eq!(Identifier::new("EMPLOYEE").quoted(), "EMPLOYEE");
    assert_eq!(Identifier::new("Mixed Case").quoted(), "\"Mixed Case\"");
    assert_eq!(Identifier::new("a\"b").quoted(), "\"a\"\"b\"");
}

#[test]
fn test_system_prefix() {
    assert!(Identifier::new("RDB$RELATIONS").has_system_prefix());
    assert!(Identifier::new("SEC$USERS").has_system_prefix());
    assert!(Identifier::new("MON$ATTACHMENTS").has_system_prefix());
    assert!(!Identifier::new("EMPLOYEE").has_system_prefix());
    assert!(has_system_prefix("RDB$X"));
}
