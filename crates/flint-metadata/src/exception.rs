//! User-defined exceptions

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct ExceptionProps {
    pub number: i32,
    pub message: String,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$exception_number, rdb$message \
               from rdb$exceptions where rdb$exception_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut ExceptionProps, row: &Row) -> Option<i64> {
    props.number = row.int(0).unwrap_or(0);
    props.message = row.trimmed_text(1).unwrap_or_default();
    None
}

/// Message text of a loaded exception
pub fn message(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::Exception(p) => Some(p.message.clone()),
        _ => None,
    })
}

pub(crate) fn seed_query(_kind: ObjectKind, _info: &ServerInfo) -> String {
    "select rdb$exception_name from rdb$exceptions \
     where (rdb$system_flag = 0 or rdb$system_flag is null) \
     order by 1"
        .to_string()
}
