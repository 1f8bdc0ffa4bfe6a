//! Character sets and their owned collations
//!
//! The charset's numeric id doubles as its metadata id; column and
//! collation rows refer to charsets by that id, so `find_by_metadata_id`
//! is the usual entry point.

use crate::database::Database;
use crate::identifier::Identifier;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Result, Row, ServerInfo, Value};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct CharacterSetProps {
    pub bytes_per_character: i32,
    pub default_collation: Option<String>,
    /// Owned collation items, loaded with the children
    pub collations: Vec<Arc<MetadataItem>>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$character_set_id, rdb$bytes_per_character, rdb$default_collate_name \
               from rdb$character_sets where rdb$character_set_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut CharacterSetProps, row: &Row) -> Option<i64> {
    props.bytes_per_character = row.int(1).unwrap_or(0);
    props.default_collation = row.trimmed_text(2);
    row.int64(0)
}

/// Load the charset's collation list (needs the charset id, so the
/// scalar properties load first)
pub(crate) async fn load_collations(item: &Arc<MetadataItem>, db: &Arc<Database>) -> Result<()> {
    item.ensure_properties_loaded(db).await?;
    let Some(charset_id) = item.metadata_id() else {
        return Ok(());
    };
    let sql = "select rdb$collation_name from rdb$collations \
               where rdb$character_set_id = ? order by rdb$collation_id";
    let loader = db.loader()?;
    loader.attach_transaction().await?;
    let fetched = loader.query(sql, &[Value::Int64(charset_id)]).await;
    loader.detach_transaction().await?;
    let rows = fetched?;

    let collations: Vec<Arc<MetadataItem>> = rows
        .iter()
        .filter_map(|row| row.trimmed_text(0))
        .map(|name| {
            let collation = MetadataItem::new(ObjectKind::Collation, Identifier::new(name));
            collation.set_parent(item);
            collation
        })
        .collect();

    item.with_properties_mut(|props| {
        if let Properties::CharacterSet(p) = props {
            p.collations = collations;
        }
    });
    Ok(())
}

/// Names of the charset's collations (children must be loaded)
pub fn collation_names(item: &MetadataItem) -> Vec<Identifier> {
    item.with_properties(|props| match props {
        Properties::CharacterSet(p) => p.collations.iter().map(|c| c.name()).collect(),
        _ => Vec::new(),
    })
}

/// Default collation name of a loaded charset
pub fn default_collation(item: &MetadataItem) -> Option<String> {
    item.with_properties(|props| match props {
        Properties::CharacterSet(p) => p.default_collation.clone(),
        _ => None,
    })
}

pub(crate) fn seed_query(_kind: ObjectKind, _info: &ServerInfo) -> String {
    "select rdb$character_set_name from rdb$character_sets order by 1".to_string()
}
