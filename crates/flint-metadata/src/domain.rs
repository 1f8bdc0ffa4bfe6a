//! Domains (named field definitions)
//!
//! Every column is backed by a domain; user domains carry user names,
//! auto-created ones the RDB$ prefix. The datatype rendering here is
//! shared with column loading.

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

/// Scalar properties of one domain
#[derive(Debug, Default)]
pub struct DomainProps {
    pub field_type: i32,
    pub sub_type: i32,
    pub length: i32,
    pub precision: Option<i32>,
    pub scale: i32,
    pub not_null: bool,
    pub default_source: Option<String>,
    pub check_constraint: Option<String>,
    pub charset_id: Option<i32>,
    pub collation_id: Option<i32>,
}

impl DomainProps {
    /// Rendered datatype, e.g. "NUMERIC(9,2)"
    pub fn datatype(&self) -> String {
        render_datatype(
            self.field_type,
            self.sub_type,
            self.length,
            self.precision,
            self.scale,
        )
    }
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select f.rdb$field_type, f.rdb$field_sub_type, f.rdb$field_length, \
               f.rdb$field_precision, f.rdb$field_scale, f.rdb$null_flag, \
               f.rdb$default_source, f.rdb$validation_source, \
               f.rdb$character_set_id, f.rdb$collation_id \
               from rdb$fields f where f.rdb$field_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut DomainProps, row: &Row) -> Option<i64> {
    props.field_type = row.int(0).unwrap_or(0);
    props.sub_type = row.int(1).unwrap_or(0);
    props.length = row.int(2).unwrap_or(0);
    props.precision = row.int(3);
    props.scale = row.int(4).unwrap_or(0);
    props.not_null = row.int(5).unwrap_or(0) != 0;
    props.default_source = row.text(6).map(|s| s.trim().to_string());
    props.check_constraint = row.text(7).map(|s| s.trim().to_string());
    props.charset_id = row.int(8);
    props.collation_id = row.int(9);
    None
}

/// Map the server's field type codes to SQL datatype text.
///
/// A negative scale (or an explicit numeric sub-type) turns the integer
/// storage types into NUMERIC/DECIMAL with the stored precision, falling
/// back to the storage width's natural precision when the server left
/// precision NULL.
pub(crate) fn render_datatype(
    field_type: i32,
    sub_type: i32,
    length: i32,
    precision: Option<i32>,
    scale: i32,
) -> String {
    let scaled = |default_precision: i32| {
        let name = if sub_type == 2 { "DECIMAL" } else { "NUMERIC" };
        let p = precision.filter(|p| *p > 0).unwrap_or(default_precision);
        format!("{}({},{})", name, p, -scale)
    };
    match field_type {
        7 => {
            if scale < 0 || sub_type != 0 {
                scaled(4)
            } else {
                "SMALLINT".to_string()
            }
        }
        8 => {
            if scale < 0 || sub_type != 0 {
                scaled(9)
            } else {
                "INTEGER".to_string()
            }
        }
        16 => {
            if scale < 0 || sub_type != 0 {
                scaled(18)
            } else {
                "BIGINT".to_string()
            }
        }
        10 => "FLOAT".to_string(),
        27 => "DOUBLE PRECISION".to_string(),
        12 => "DATE".to_string(),
        13 => "TIME".to_string(),
        35 => "TIMESTAMP".to_string(),
        14 => format!("CHAR({})", length),
        37 => format!("VARCHAR({})", length),
        23 => "BOOLEAN".to_string(),
        261 => format!("BLOB SUB_TYPE {}", sub_type),
        other => format!("<unknown type {}>", other),
    }
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Domains => {
            "select rdb$field_name from rdb$fields \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$field_name not starting with 'RDB$' \
             order by 1"
        }
        ObjectKind::SystemDomains => {
            "select rdb$field_name from rdb$fields \
             where rdb$field_name starting with 'RDB$' \
             order by 1"
        }
        _ => unreachable!("not a domain collection"),
    }
    .to_string()
}

/// Read the rendered datatype of a loaded domain item
pub fn datatype(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::Domain(p) => Some(p.datatype()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
