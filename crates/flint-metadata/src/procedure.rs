//! Stored procedures

use crate::database::Database;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Result, Row, ServerInfo, Value};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ProcedureProps {
    pub source: Option<String>,
    pub owner: Option<String>,
    pub entry_point: Option<String>,
    pub engine_name: Option<String>,
    pub sql_security: Option<String>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let mut sql = String::from("select rdb$procedure_source, rdb$owner_name, ");
    sql += if info.ods_at_least(12, 0) {
        " rdb$entrypoint, rdb$engine_name, "
    } else {
        " null, null, "
    };
    sql += if info.ods_at_least(13, 0) {
        " rdb$sql_security "
    } else {
        " null "
    };
    sql += "from rdb$procedures where rdb$procedure_name = ? ";
    Some((sql, vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut ProcedureProps, row: &Row) -> Option<i64> {
    props.source = row.text(0).map(|s| s.to_string());
    props.owner = row.trimmed_text(1);
    props.entry_point = row.trimmed_text(2);
    props.engine_name = row.trimmed_text(3);
    props.sql_security = row
        .bool(4)
        .map(|b| crate::relation::sql_security_text(b).to_string());
    None
}

/// Source text of a loaded procedure
pub fn source(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::Procedure(p) => p.source.clone(),
        _ => None,
    })
}

pub(crate) fn seed_query(_kind: ObjectKind, info: &ServerInfo) -> String {
    let mut sql = String::from(
        "select rdb$procedure_name from rdb$procedures \
         where (rdb$system_flag = 0 or rdb$system_flag is null) ",
    );
    // packaged procedures appear under their package, not here
    if info.ods_at_least(12, 0) {
        sql += " and rdb$package_name is null ";
    }
    sql += " order by 1";
    sql
}

/// Re-check procedures depending on the just-altered one: their cached
/// sources may now refer to changed parameters
pub(crate) async fn check_dependent_procedures(
    db: &Arc<Database>,
    altered: &Arc<MetadataItem>,
) -> Result<()> {
    let sql = "select distinct rdb$dependent_name from rdb$dependencies \
               where rdb$depended_on_name = ? \
               and rdb$dependent_type = 5 and rdb$depended_on_type = 5";
    let loader = db.loader()?;
    loader.attach_transaction().await?;
    let fetched = loader
        .query(sql, &[Value::from(altered.name().get())])
        .await;
    loader.detach_transaction().await?;
    let rows = fetched?;

    let Some(procedures) = db.collection(ObjectKind::Procedures) else {
        return Ok(());
    };
    for row in rows {
        let Some(name) = row.trimmed_text(0) else {
            continue;
        };
        if let Some(dependent) = procedures.find_by_name(&name) {
            tracing::debug!(procedure = %name, "invalidating dependent procedure");
            dependent.invalidate();
            dependent.notify_observers();
        }
    }
    Ok(())
}
