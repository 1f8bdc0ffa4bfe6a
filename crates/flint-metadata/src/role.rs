//! Roles

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct RoleProps {
    pub owner: Option<String>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$owner_name from rdb$roles where rdb$role_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut RoleProps, row: &Row) -> Option<i64> {
    props.owner = row.trimmed_text(0);
    None
}

/// Owner of a loaded role
pub fn owner(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::Role(p) => p.owner.clone(),
        _ => None,
    })
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Roles => {
            "select rdb$role_name from rdb$roles \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             order by 1"
        }
        ObjectKind::SystemRoles => {
            "select rdb$role_name from rdb$roles \
             where rdb$system_flag <> 0 \
             order by 1"
        }
        _ => unreachable!("not a role collection"),
    }
    .to_string()
}
