//! Standalone index objects
//!
//! The segment list comes back as one row per segment from the joined
//! query; all rows describe the same index.

use crate::identifier::Identifier;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct IndexProps {
    pub relation_name: Option<Identifier>,
    pub unique: bool,
    pub active: bool,
    pub statistics: f64,
    pub segments: Vec<Identifier>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select i.rdb$relation_name, i.rdb$unique_flag, i.rdb$index_inactive, \
               i.rdb$statistics, s.rdb$field_name \
               from rdb$indices i \
               left join rdb$index_segments s on s.rdb$index_name = i.rdb$index_name \
               where i.rdb$index_name = ? \
               order by s.rdb$field_position";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_rows(props: &mut IndexProps, rows: &[Row]) -> Option<i64> {
    let first = &rows[0];
    props.relation_name = first.trimmed_text(0).map(Identifier::new);
    props.unique = first.int(1).unwrap_or(0) != 0;
    props.active = first.int(2).unwrap_or(0) == 0;
    props.statistics = match first.get(3) {
        Some(Value::Double(v)) => *v,
        _ => 0.0,
    };
    props.segments = rows
        .iter()
        .filter_map(|row| row.trimmed_text(4).map(Identifier::new))
        .collect();
    None
}

/// Owning relation of a loaded index
pub fn relation_name(item: &MetadataItem) -> Option<Identifier> {
    item.with_properties(|props| match props {
        Properties::Index(p) => p.relation_name.clone(),
        _ => None,
    })
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Indices => {
            "select rdb$index_name from rdb$indices \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             order by 1"
        }
        ObjectKind::SystemIndices => {
            "select rdb$index_name from rdb$indices \
             where rdb$system_flag = 1 or rdb$index_name starting with 'RDB$' \
             order by 1"
        }
        _ => unreachable!("not an index collection"),
    }
    .to_string()
}
