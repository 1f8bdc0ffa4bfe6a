//! Schemas (multi-schema servers, ODS 14+)
//!
//! A schema is itself a metadata item whose payload owns a nested
//! container. System and user schemas get different collection sets, so
//! the container is composed after the schema's properties (and with
//! them the system flag) have loaded.

use crate::collection::MetadataCollection;
use crate::container::MetadataContainer;
use crate::database::Database;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{ProgressIndicator, Result, Row, ServerInfo, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Scalar properties and the nested container of one schema
#[derive(Debug, Default)]
pub struct SchemaProps {
    pub character_set_name: Option<String>,
    pub character_set_schema_name: Option<String>,
    pub system: bool,
    pub container: Option<Arc<MetadataContainer>>,
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    _info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let sql = "select rdb$schema_name, \
               rdb$character_set_name, \
               rdb$character_set_schema_name, \
               rdb$sql_security, \
               rdb$system_flag, \
               rdb$description \
               from rdb$schemas \
               where rdb$schema_name = ? ";
    Some((sql.to_string(), vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut SchemaProps, row: &Row) -> Option<i64> {
    props.character_set_name = row.trimmed_text(1);
    props.character_set_schema_name = row.trimmed_text(2);
    props.system = row.bool(4).unwrap_or(false);
    None
}

pub(crate) fn seed_query(_kind: ObjectKind, _info: &ServerInfo) -> String {
    "select rdb$schema_name from rdb$schemas order by rdb$schema_name".to_string()
}

/// The schema's nested container, if composed already
pub fn container(item: &MetadataItem) -> Option<Arc<MetadataContainer>> {
    item.with_properties(|props| match props {
        Properties::Schema(p) => p.container.clone(),
        _ => None,
    })
}

/// Whether the schema is server-predefined (valid after properties load)
pub fn is_system(item: &MetadataItem) -> bool {
    item.with_properties(|props| match props {
        Properties::Schema(p) => p.system,
        _ => false,
    })
}

/// Load the schema list, then every schema's own nested collections
pub(crate) async fn load_schemas(
    db: &Arc<Database>,
    schemas: &Arc<MetadataCollection>,
    progress: &dyn ProgressIndicator,
) -> Result<()> {
    schemas.load(db, progress).await?;
    for schema_item in schemas.items() {
        load_nested(db, &schema_item, progress).await?;
    }
    Ok(())
}

/// Load one schema's properties, compose its container on first touch,
/// and load the nested collections.
///
/// Boxed because this recurses back into `load_collections`.
pub(crate) fn load_nested<'a>(
    db: &'a Arc<Database>,
    schema_item: &'a Arc<MetadataItem>,
    progress: &'a dyn ProgressIndicator,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        crate::database::ignore_missing(schema_item.ensure_properties_loaded(db).await)?;
        // the system flag lives in the payload; mirror it on the item
        schema_item.set_system(is_system(schema_item));

        let nested = match container(schema_item) {
            Some(existing) => existing,
            None => {
                let composed = compose_container(schema_item);
                schema_item.with_properties_mut(|props| {
                    if let Properties::Schema(p) = props {
                        p.container = Some(composed.clone());
                    }
                });
                composed
            }
        };

        schema_item.set_children_loaded(false);
        nested.load_collections(db, progress).await?;
        schema_item.set_children_loaded(true);
        Ok(())
    })
}

/// System schemas expose the system collections, user schemas the full
/// user-object set
fn compose_container(schema_item: &Arc<MetadataItem>) -> Arc<MetadataContainer> {
    let container = Arc::new(MetadataContainer::new());
    let add =
        |kind: ObjectKind| container.add_collection(MetadataCollection::new(kind, schema_item));

    if schema_item.is_system() || is_system(schema_item) {
        add(ObjectKind::CharacterSets);
        add(ObjectKind::SystemDomains);
        add(ObjectKind::SystemIndices);
        add(ObjectKind::SystemPackages);
        add(ObjectKind::SystemRoles);
        add(ObjectKind::SystemTables);
    } else {
        add(ObjectKind::CharacterSets);
        add(ObjectKind::Collations);
        add(ObjectKind::Domains);
        add(ObjectKind::Exceptions);
        add(ObjectKind::Functions);
        add(ObjectKind::Generators);
        add(ObjectKind::GlobalTemporaryTables);
        add(ObjectKind::Udfs);
        add(ObjectKind::Indices);
        add(ObjectKind::Packages);
        add(ObjectKind::Procedures);
        add(ObjectKind::Tables);
        add(ObjectKind::DdlTriggers);
        add(ObjectKind::DbTriggers);
        add(ObjectKind::DmlTriggers);
        add(ObjectKind::Views);
    }
    container
}
