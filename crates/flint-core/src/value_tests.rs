//! Tests for core value types

use super::*;

mod value_tests {
    use super::*;

    #[test]
    fn test_null_checks() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int32(0).is_null());
        assert!(Value::Null.as_str().is_none());
        assert!(Value::Null.as_i64().is_none());
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::Int16(7).as_i64(), Some(7));
        assert_eq!(Value::Int32(-3).as_i64(), Some(-3));
        assert_eq!(Value::Int64(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(Value::Text("12".into()).as_i64(), None);
    }

    #[test]
    fn test_integer_flags_as_bool() {
        assert_eq!(Value::Int16(0).as_bool(), Some(false));
        assert_eq!(Value::Int16(1).as_bool(), Some(true));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Text("Y".into()).as_bool(), None);
    }

    #[test]
    fn test_blob_reads_as_text() {
        let v = Value::Blob("begin end".into());
        assert_eq!(v.as_str(), Some("begin end"));
    }
}

mod row_tests {
    use super::*;

    fn sample() -> Row {
        Row::new(vec![
            Value::Text("EMPLOYEE   ".into()),
            Value::Null,
            Value::Int32(42),
        ])
    }

    #[test]
    fn test_positional_access() {
        let row = sample();
        assert_eq!(row.len(), 3);
        assert_eq!(row.text(0), Some("EMPLOYEE   "));
        assert_eq!(row.int(2), Some(42));
    }

    #[test]
    fn test_trimmed_text_strips_char_padding() {
        let row = sample();
        assert_eq!(row.trimmed_text(0).as_deref(), Some("EMPLOYEE"));
    }

    #[test]
    fn test_null_and_out_of_range_columns() {
        let row = sample();
        assert!(row.is_null(1));
        assert!(row.is_null(17));
        assert_eq!(row.text(1), None);
        assert_eq!(row.int(17), None);
    }
}
