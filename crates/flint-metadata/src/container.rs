//! A collection-of-collections for one schema scope
//!
//! The database root owns one container; in multi-schema mode every
//! schema item owns another. Cross-kind lookups dispatch on each
//! collection's type tag, and the `dropObject`/`addObject` routing uses
//! the kind-offset arithmetic (`collection = item + 1`).

use crate::collection::MetadataCollection;
use crate::database::Database;
use crate::identifier::Identifier;
use crate::item::MetadataItem;
use crate::kinds::ObjectKind;
use crate::schema;
use flint_core::{ProgressIndicator, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Ordered set of typed collections for one scope
#[derive(Default)]
pub struct MetadataContainer {
    collections: RwLock<Vec<Arc<MetadataCollection>>>,
}

impl MetadataContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection; registration order is load order
    pub fn add_collection(&self, collection: Arc<MetadataCollection>) {
        self.collections.write().push(collection);
    }

    /// Snapshot of the registered collections, in registration order
    pub fn collections(&self) -> Vec<Arc<MetadataCollection>> {
        self.collections.read().clone()
    }

    /// The registered collections, optionally without system-object ones
    pub fn visible_collections(&self, include_system: bool) -> Vec<Arc<MetadataCollection>> {
        self.collections
            .read()
            .iter()
            .filter(|c| include_system || !c.is_system())
            .cloned()
            .collect()
    }

    /// The collection with a given type tag
    pub fn collection(&self, kind: ObjectKind) -> Option<Arc<MetadataCollection>> {
        self.collections
            .read()
            .iter()
            .find(|c| c.kind() == kind)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.collections.read().len()
    }

    /// Single-collection lookup by collection tag and item name
    pub fn find_by_kind_and_name(&self, kind: ObjectKind, name: &str) -> Option<Arc<MetadataItem>> {
        self.collection(kind)?.find_by_name(name)
    }

    /// Single-collection lookup by collection tag and metadata id
    pub fn find_by_kind_and_id(&self, kind: ObjectKind, id: i64) -> Option<Arc<MetadataItem>> {
        self.collection(kind)?.find_by_metadata_id(id)
    }

    /// Resolve a name that may denote any relation. Priority order is
    /// fixed: tables, then global temporary tables, then views, then
    /// system tables; the first match wins.
    pub fn find_relation(&self, name: &Identifier) -> Option<Arc<MetadataItem>> {
        for kind in [
            ObjectKind::Tables,
            ObjectKind::GlobalTemporaryTables,
            ObjectKind::Views,
            ObjectKind::SystemTables,
        ] {
            if let Some(found) = self.find_by_kind_and_name(kind, name.get()) {
                return Some(found);
            }
        }
        None
    }

    /// The domain with a given name, dispatched to the system or user
    /// collection by name prefix
    pub fn find_domain(&self, name: &Identifier) -> Option<Arc<MetadataItem>> {
        let kind = if name.has_system_prefix() {
            ObjectKind::SystemDomains
        } else {
            ObjectKind::Domains
        };
        self.find_by_kind_and_name(kind, name.get())
    }

    /// Names of every contained item across all collections
    pub fn all_names(&self) -> Vec<Identifier> {
        self.collections
            .read()
            .iter()
            .flat_map(|c| c.items().into_iter().map(|item| item.name()))
            .collect()
    }

    /// Defer notifications on every collection
    pub fn lock_subject(&self) {
        for collection in self.collections.read().iter() {
            collection.lock_subject();
        }
    }

    /// Undo one `lock_subject`
    pub fn unlock_subject(&self) {
        for collection in self.collections.read().iter() {
            collection.unlock_subject();
        }
    }

    /// Load every collection in registration order.
    ///
    /// One metadata transaction spans the whole batch so all name lists
    /// observe the same snapshot; per-collection notifications are
    /// coalesced into one signal each. A schema-list collection
    /// recursively loads every schema's own nested container.
    pub async fn load_collections(
        &self,
        db: &Arc<Database>,
        progress: &dyn ProgressIndicator,
    ) -> Result<()> {
        let collections = self.collections();
        let total = collections.len();

        let loader = db.loader()?;
        loader.attach_transaction().await?;
        self.lock_subject();

        let mut result = Ok(());
        for (step, collection) in collections.iter().enumerate() {
            progress.init_progress(
                &format!("Loading {}...", collection.qualified_title()),
                total,
                step,
                1,
            );
            let loaded = if collection.kind() == ObjectKind::Schemas {
                schema::load_schemas(db, collection, progress).await
            } else {
                collection.load(db, progress).await
            };
            if let Err(error) = loaded {
                result = Err(error);
                break;
            }
            progress.step_progress();
        }

        self.unlock_subject();
        loader.detach_transaction().await?;
        result
    }

    /// Remove a dropped object from the one collection whose tag matches
    pub fn drop_object(&self, item: &Arc<MetadataItem>) -> bool {
        let Some(collection_kind) = item.kind().collection_kind() else {
            return false;
        };
        match self.collection(collection_kind) {
            Some(collection) => collection.remove(item),
            None => false,
        }
    }

    /// Insert an empty placeholder into the matching collection after an
    /// observed CREATE; no reload happens
    pub fn add_object(&self, kind: ObjectKind, name: Identifier) -> Option<Arc<MetadataItem>> {
        let collection_kind = kind.collection_kind()?;
        self.collection(collection_kind)
            .map(|collection| collection.insert(name))
    }
}

impl std::fmt::Debug for MetadataContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataContainer")
            .field("collections", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
