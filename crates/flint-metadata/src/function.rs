//! Functions: PSQL functions (ODS 12+) and legacy UDFs

use crate::item::MetadataItem;
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

#[derive(Debug, Default)]
pub struct FunctionProps {
    pub module_name: Option<String>,
    pub entry_point: Option<String>,
    pub source: Option<String>,
    pub engine_name: Option<String>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let mut sql = String::from("select rdb$module_name, rdb$entrypoint, ");
    sql += if info.ods_at_least(12, 0) {
        " rdb$function_source, rdb$engine_name "
    } else {
        " null, null "
    };
    sql += "from rdb$functions where rdb$function_name = ? ";
    Some((sql, vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut FunctionProps, row: &Row) -> Option<i64> {
    props.module_name = row.trimmed_text(0);
    props.entry_point = row.trimmed_text(1);
    props.source = row.text(2).map(|s| s.to_string());
    props.engine_name = row.trimmed_text(3);
    None
}

pub(crate) fn seed_query(kind: ObjectKind, info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Functions => {
            // PSQL functions only exist from ODS 12 on
            "select rdb$function_name from rdb$functions \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$legacy_flag = 0 and rdb$package_name is null \
             order by 1"
                .to_string()
        }
        ObjectKind::Udfs => {
            let mut sql = String::from(
                "select rdb$function_name from rdb$functions \
                 where (rdb$system_flag = 0 or rdb$system_flag is null) ",
            );
            if info.ods_at_least(12, 0) {
                sql += " and rdb$legacy_flag = 1 and rdb$package_name is null ";
            }
            sql += " order by 1";
            sql
        }
        _ => unreachable!("not a function collection"),
    }
}
