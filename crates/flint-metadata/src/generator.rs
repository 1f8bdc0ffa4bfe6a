//! Generators (sequences)
//!
//! The current value is read with `gen_id(..., 0)`, so it goes stale the
//! moment anyone increments the sequence; the change interpreter
//! invalidates it on SET/ALTER.

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct GeneratorProps {
    pub value: i64,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    // gen_id takes the sequence itself, not a string parameter
    let sql = format!(
        "select gen_id({}, 0) from rdb$database",
        item.quoted_name()
    );
    Some((sql, Vec::new()))
}

pub(crate) fn apply_row(props: &mut GeneratorProps, row: &Row) -> Option<i64> {
    props.value = row.int64(0).unwrap_or(0);
    None
}

/// Current value of a loaded generator
pub fn value(item: &MetadataItem) -> Option<i64> {
    item.with_properties(|props| match props {
        Properties::Generator(p) => Some(p.value),
        _ => None,
    })
}

pub(crate) fn seed_query(_kind: ObjectKind, _info: &ServerInfo) -> String {
    "select rdb$generator_name from rdb$generators \
     where (rdb$system_flag = 0 or rdb$system_flag is null) \
     order by 1"
        .to_string()
}
