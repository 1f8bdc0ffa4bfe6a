//! Server users
//!
//! One payload for every server version. From ODS 12 the security
//! database exposes sec$users with name parts, the active/admin flags
//! and the authentication plugin; older servers only reveal which user
//! names hold privileges, so everything beyond the name stays at its
//! default.

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct UserProps {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub active: bool,
    pub admin: bool,
    pub plugin: String,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = if info.ods_at_least(12, 0) {
        "select sec$user_name, \
         sec$first_name, \
         sec$middle_name, \
         sec$last_name, \
         sec$active, \
         sec$admin, \
         sec$description, \
         sec$plugin \
         from sec$users \
         where sec$user_name = ? "
    } else {
        "select distinct rdb$user from rdb$user_privileges where rdb$user = ? "
    };
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut UserProps, row: &Row) -> Option<i64> {
    if row.len() <= 1 {
        // pre-12 server: the name is all there is
        *props = UserProps::default();
        return None;
    }
    props.first_name = row.trimmed_text(1).unwrap_or_default();
    props.middle_name = row.trimmed_text(2).unwrap_or_default();
    props.last_name = row.trimmed_text(3).unwrap_or_default();
    props.active = row.bool(4).unwrap_or(false);
    props.admin = row.bool(5).unwrap_or(false);
    props.plugin = row.trimmed_text(7).unwrap_or_default();
    None
}

pub(crate) fn seed_query(_kind: ObjectKind, info: &ServerInfo) -> String {
    if info.ods_at_least(12, 0) {
        "select sec$user_name from sec$users order by 1 "
    } else {
        "select distinct rdb$user from rdb$user_privileges order by 1 "
    }
    .to_string()
}

/// ALTER USER statement skeleton for a loaded user
pub fn alter_sql(item: &MetadataItem) -> String {
    item.with_properties(|props| {
        let Properties::User(p) = props else {
            return String::new();
        };
        let mut sql = format!("ALTER USER {} \n", item.name());
        sql += "PASSWORD '' \n";
        sql += &format!("FIRSTNAME '{}' \n", p.first_name);
        sql += &format!("MIDDLENAME '{}' \n", p.middle_name);
        sql += &format!("LASTNAME '{}' \n", p.last_name);
        sql += if p.active { "ACTIVE \n" } else { "INACTIVE \n" };
        if p.admin {
            sql += "GRANT ADMIN ROLE \n";
        }
        if !p.plugin.is_empty() {
            sql += &format!("USING PLUGIN {} \n", p.plugin);
        }
        sql
    })
}
