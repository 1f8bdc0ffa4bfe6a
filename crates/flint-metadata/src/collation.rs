//! Collations

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct CollationProps {
    pub charset_id: Option<i32>,
    pub attributes: i32,
    pub base_collation: Option<String>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$character_set_id, rdb$collation_attributes, rdb$base_collation_name \
               from rdb$collations where rdb$collation_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut CollationProps, row: &Row) -> Option<i64> {
    props.charset_id = row.int(0);
    props.attributes = row.int(1).unwrap_or(0);
    props.base_collation = row.trimmed_text(2);
    None
}

pub(crate) fn seed_query(_kind: ObjectKind, _info: &ServerInfo) -> String {
    "select rdb$collation_name from rdb$collations \
     where (rdb$system_flag = 0 or rdb$system_flag is null) \
     order by 1"
        .to_string()
}

/// Character set id of a loaded collation
pub fn charset_id(item: &MetadataItem) -> Option<i32> {
    item.with_properties(|props| match props {
        Properties::Collation(p) => p.charset_id,
        _ => None,
    })
}
