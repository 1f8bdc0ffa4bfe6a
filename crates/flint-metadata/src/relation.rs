//! Tables, views, global temporary tables and their columns
//!
//! Index metadata is cached denormalized on the owning relation so the
//! property page can render without a round-trip per index; the change
//! interpreter drops that cache when an index statement touches it.

use crate::database::Database;
use crate::domain;
use crate::identifier::Identifier;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Result, Row, ServerInfo, Value};
use std::sync::Arc;

/// Scalar properties shared by every relation kind
#[derive(Debug, Default)]
pub struct RelationProps {
    pub owner: Option<String>,
    /// View definition; `None` for tables
    pub view_source: Option<String>,
    pub external_file: Option<String>,
    pub relation_type: Option<i32>,
    pub sql_security: Option<String>,
    /// Owned column items, in field position order
    pub columns: Vec<Arc<MetadataItem>>,
    /// Denormalized index cache; `None` until first use
    pub indices: Option<Vec<RelationIndex>>,
}

/// One cached index row on a relation
#[derive(Debug, Clone)]
pub struct RelationIndex {
    pub name: Identifier,
    pub unique: bool,
    pub active: bool,
    pub statistics: f64,
}

/// Scalar properties of one column
#[derive(Debug, Default)]
pub struct ColumnProps {
    /// Source domain name (every column is backed by one)
    pub source: Option<Identifier>,
    pub not_null: bool,
    pub default_source: Option<String>,
    /// Rendered datatype, e.g. "VARCHAR(60)"
    pub datatype: String,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let mut sql = String::from(
        "select rdb$owner_name, rdb$view_source, rdb$relation_id, \
         rdb$external_file, rdb$relation_type, ",
    );
    sql += if info.ods_at_least(13, 0) {
        " rdb$sql_security "
    } else {
        " null "
    };
    sql += "from rdb$relations where rdb$relation_name = ? ";
    Some((sql, vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut RelationProps, row: &Row) -> Option<i64> {
    props.owner = row.trimmed_text(0);
    props.view_source = row.text(1).map(|s| s.to_string());
    props.external_file = row.trimmed_text(3);
    props.relation_type = row.int(4);
    props.sql_security = row
        .bool(5)
        .map(|b| sql_security_text(b).to_string());
    row.int64(2)
}

pub(crate) fn sql_security_text(definer: bool) -> &'static str {
    if definer {
        "SQL SECURITY DEFINER"
    } else {
        "SQL SECURITY INVOKER"
    }
}

const COLUMN_FIELDS: &str = "r.rdb$field_source, r.rdb$null_flag, r.rdb$default_source, \
     f.rdb$field_type, f.rdb$field_sub_type, f.rdb$field_length, \
     f.rdb$field_precision, f.rdb$field_scale";

pub(crate) fn column_properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let relation = item.parent()?.name();
    let sql = format!(
        "select {} from rdb$relation_fields r \
         join rdb$fields f on f.rdb$field_name = r.rdb$field_source \
         where r.rdb$relation_name = ? and r.rdb$field_name = ? ",
        COLUMN_FIELDS
    );
    Some((
        sql,
        vec![Value::from(relation.get()), Value::from(item.name().get())],
    ))
}

pub(crate) fn apply_column_row(props: &mut ColumnProps, row: &Row) -> Option<i64> {
    apply_column_fields(props, row, 0);
    None
}

fn apply_column_fields(props: &mut ColumnProps, row: &Row, offset: usize) {
    props.source = row.trimmed_text(offset).map(Identifier::new);
    props.not_null = row.int(offset + 1).unwrap_or(0) != 0;
    props.default_source = row.text(offset + 2).map(|s| s.trim().to_string());
    props.datatype = domain::render_datatype(
        row.int(offset + 3).unwrap_or(0),
        row.int(offset + 4).unwrap_or(0),
        row.int(offset + 5).unwrap_or(0),
        row.int(offset + 6),
        row.int(offset + 7).unwrap_or(0),
    );
}

/// Load the relation's column list, preserving already-known columns by
/// name so their cached state survives a reload
pub(crate) async fn load_columns(item: &Arc<MetadataItem>, db: &Arc<Database>) -> Result<()> {
    let sql = format!(
        "select r.rdb$field_name, {} from rdb$relation_fields r \
         join rdb$fields f on f.rdb$field_name = r.rdb$field_source \
         where r.rdb$relation_name = ? order by r.rdb$field_position",
        COLUMN_FIELDS
    );
    let loader = db.loader()?;
    loader.attach_transaction().await?;
    let fetched = loader
        .query(&sql, &[Value::from(item.name().get())])
        .await;
    loader.detach_transaction().await?;
    let rows = fetched?;

    let existing = columns(item);
    let mut rebuilt = Vec::with_capacity(rows.len());
    for row in &rows {
        let Some(name) = row.trimmed_text(0) else {
            continue;
        };
        let column = existing
            .iter()
            .find(|c| c.name().equals(&name))
            .cloned()
            .unwrap_or_else(|| {
                let column = MetadataItem::new(ObjectKind::Column, Identifier::new(name));
                column.set_parent(item);
                column
            });
        column.with_properties_mut(|props| {
            if let Properties::Column(p) = props {
                apply_column_fields(p, row, 1);
            }
        });
        column.set_properties_loaded(true);
        rebuilt.push(column);
    }

    item.with_properties_mut(|props| {
        if let Properties::Relation(p) = props {
            p.columns = rebuilt;
        }
    });
    Ok(())
}

/// The relation's loaded column items (empty until children load)
pub fn columns(item: &MetadataItem) -> Vec<Arc<MetadataItem>> {
    item.with_properties(|props| match props {
        Properties::Relation(p) => p.columns.clone(),
        _ => Vec::new(),
    })
}

/// Find a loaded column by name
pub fn find_column(item: &MetadataItem, name: &Identifier) -> Option<Arc<MetadataItem>> {
    columns(item).into_iter().find(|c| c.name() == *name)
}

/// Source domain of a loaded column
pub fn column_source(column: &MetadataItem) -> Option<Identifier> {
    column.with_properties(|props| match props {
        Properties::Column(p) => p.source.clone(),
        _ => None,
    })
}

/// Populate the denormalized index cache
pub(crate) async fn load_indices(item: &Arc<MetadataItem>, db: &Arc<Database>) -> Result<()> {
    let sql = "select rdb$index_name, rdb$unique_flag, rdb$index_inactive, rdb$statistics \
               from rdb$indices where rdb$relation_name = ? order by rdb$index_name";
    let loader = db.loader()?;
    loader.attach_transaction().await?;
    let fetched = loader.query(sql, &[Value::from(item.name().get())]).await;
    loader.detach_transaction().await?;
    let rows = fetched?;

    let cache: Vec<RelationIndex> = rows
        .iter()
        .filter_map(|row| {
            row.trimmed_text(0).map(|name| RelationIndex {
                name: Identifier::new(name),
                unique: row.int(1).unwrap_or(0) != 0,
                active: row.int(2).unwrap_or(0) == 0,
                statistics: match row.get(3) {
                    Some(Value::Double(v)) => *v,
                    _ => 0.0,
                },
            })
        })
        .collect();

    item.with_properties_mut(|props| {
        if let Properties::Relation(p) = props {
            p.indices = Some(cache);
        }
    });
    Ok(())
}

/// The cached indices, loading them on first use
pub async fn indices(item: &Arc<MetadataItem>, db: &Arc<Database>) -> Result<Vec<RelationIndex>> {
    let cached = item.with_properties(|props| match props {
        Properties::Relation(p) => p.indices.clone(),
        _ => Some(Vec::new()),
    });
    if let Some(cache) = cached {
        return Ok(cache);
    }
    load_indices(item, db).await?;
    Ok(item.with_properties(|props| match props {
        Properties::Relation(p) => p.indices.clone().unwrap_or_default(),
        _ => Vec::new(),
    }))
}

/// Forget cached index metadata.
///
/// With a name, the cache is only dropped when it actually holds that
/// index; without one it is dropped unconditionally. Returns whether
/// anything changed (observers are notified in that case).
pub fn invalidate_indices(item: &MetadataItem, index_name: Option<&Identifier>) -> bool {
    let changed = item.with_properties_mut(|props| {
        let Properties::Relation(p) = props else {
            return false;
        };
        match (&p.indices, index_name) {
            (Some(cache), Some(name)) if cache.iter().any(|i| i.name == *name) => {
                p.indices = None;
                true
            }
            (Some(_), None) => {
                p.indices = None;
                true
            }
            _ => false,
        }
    });
    if changed {
        item.notify_observers();
    }
    changed
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::Tables => {
            "select rdb$relation_name from rdb$relations \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$view_blr is null \
             and (rdb$relation_type is null or rdb$relation_type in (0, 2)) \
             order by 1"
        }
        ObjectKind::SystemTables => {
            "select rdb$relation_name from rdb$relations \
             where rdb$system_flag = 1 and rdb$view_blr is null \
             order by 1"
        }
        ObjectKind::GlobalTemporaryTables => {
            "select rdb$relation_name from rdb$relations \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$relation_type in (4, 5) \
             order by 1"
        }
        ObjectKind::Views => {
            "select rdb$relation_name from rdb$relations \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$view_blr is not null \
             order by 1"
        }
        _ => unreachable!("not a relation collection"),
    }
    .to_string()
}
