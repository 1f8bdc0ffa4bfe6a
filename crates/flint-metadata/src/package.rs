//! Packages (ODS 12+)

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct PackageProps {
    pub header_source: Option<String>,
    pub body_source: Option<String>,
    pub owner: Option<String>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$package_header_source, rdb$package_body_source, rdb$owner_name \
               from rdb$packages where rdb$package_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut PackageProps, row: &Row) -> Option<i64> {
    props.header_source = row.text(0).map(|s| s.to_string());
    props.body_source = row.text(1).map(|s| s.to_string());
    props.owner = row.trimmed_text(2);
    None
}

/// Header source of a loaded package
pub fn header_source(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::Package(p) => p.header_source.clone(),
        _ => None,
    })
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Packages => {
            "select rdb$package_name from rdb$packages \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             order by 1"
        }
        ObjectKind::SystemPackages => {
            "select rdb$package_name from rdb$packages \
             where rdb$system_flag = 1 \
             order by 1"
        }
        _ => unreachable!("not a package collection"),
    }
    .to_string()
}
