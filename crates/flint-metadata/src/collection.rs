//! Typed, ordered, name-indexed containers of metadata items
//!
//! A collection owns the items of one kind within one scope. `load`
//! re-fetches the server's name list and reconciles it against the
//! in-memory sequence: names that persist keep their item (and its
//! cached state), vanished names drop out, new names append as empty
//! items. No detail queries run here.

use crate::database::Database;
use crate::identifier::Identifier;
use crate::item::MetadataItem;
use crate::kinds::ObjectKind;
use crate::subject::{MetadataObserver, Subject};
use crate::{
    charset, collation, domain, exception, function, generator, index, package, procedure,
    relation, role, schema, trigger, user,
};
use flint_core::{ProgressIndicator, Result, ServerInfo};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// One typed collection of metadata items
pub struct MetadataCollection {
    kind: ObjectKind,
    item_kind: ObjectKind,
    owner: RwLock<Weak<MetadataItem>>,
    seed_override: Option<String>,
    items: RwLock<Vec<Arc<MetadataItem>>>,
    subject: Subject,
}

impl MetadataCollection {
    /// Create an empty collection; `kind` must be a collection kind
    pub fn new(kind: ObjectKind, owner: &Arc<MetadataItem>) -> Arc<MetadataCollection> {
        debug_assert!(kind.is_collection(), "{:?} is not a collection kind", kind);
        Arc::new(MetadataCollection {
            kind,
            item_kind: kind.item_kind().expect("collection kind"),
            owner: RwLock::new(Arc::downgrade(owner)),
            seed_override: None,
            items: RwLock::new(Vec::new()),
            subject: Subject::new(),
        })
    }

    /// As `new`, but with an explicit seed query replacing the kind's
    /// default (the single-node index view uses this)
    pub fn with_seed_query(
        kind: ObjectKind,
        owner: &Arc<MetadataItem>,
        seed: impl Into<String>,
    ) -> Arc<MetadataCollection> {
        debug_assert!(kind.is_collection(), "{:?} is not a collection kind", kind);
        Arc::new(MetadataCollection {
            kind,
            item_kind: kind.item_kind().expect("collection kind"),
            owner: RwLock::new(Arc::downgrade(owner)),
            seed_override: Some(seed.into()),
            items: RwLock::new(Vec::new()),
            subject: Subject::new(),
        })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn item_kind(&self) -> ObjectKind {
        self.item_kind
    }

    /// Human-readable title, e.g. "Tables"
    pub fn title(&self) -> &'static str {
        self.kind.collection_title()
    }

    /// Title prefixed with the owning schema's name in multi-schema mode
    pub fn qualified_title(&self) -> String {
        match self.owner.read().upgrade() {
            Some(owner) if owner.kind() == ObjectKind::Schema => {
                format!("{}.{}", owner.name(), self.title())
            }
            _ => self.title().to_string(),
        }
    }

    pub fn owner(&self) -> Option<Arc<MetadataItem>> {
        self.owner.read().upgrade()
    }

    /// Whether this collection holds system objects
    pub fn is_system(&self) -> bool {
        self.kind.is_system()
    }

    /// Re-fetch the name list from the server and reconcile
    pub async fn load(
        self: &Arc<Self>,
        db: &Arc<Database>,
        progress: &dyn ProgressIndicator,
    ) -> Result<()> {
        db.check_connected(self.kind.type_name())?;
        let info = db.server_info()?;
        let sql = match &self.seed_override {
            Some(seed) => seed.clone(),
            None => seed_query(self.kind, &info),
        };
        let names = db.load_identifiers(&sql, progress).await?;
        tracing::debug!(kind = ?self.kind, count = names.len(), "collection loaded");
        self.set_items(names);
        Ok(())
    }

    /// Reconcile against a fresh name list. Items whose names persist
    /// are preserved untouched (no wasted reload), vanished names are
    /// dropped, new names appended as empty items.
    pub fn set_items(self: &Arc<Self>, names: Vec<Identifier>) {
        let mut changed = false;
        {
            let mut items = self.items.write();
            let old_len = items.len();
            let rebuilt: Vec<Arc<MetadataItem>> = names
                .into_iter()
                .map(|name| {
                    match items.iter().find(|item| item.name() == name) {
                        Some(existing) => existing.clone(),
                        None => {
                            changed = true;
                            self.new_item(name)
                        }
                    }
                })
                .collect();
            if rebuilt.len() != old_len {
                changed = true;
            }
            *items = rebuilt;
        }
        if changed {
            self.subject.notify();
        }
    }

    fn new_item(&self, name: Identifier) -> Arc<MetadataItem> {
        let item = MetadataItem::new(self.item_kind, name);
        if let Some(owner) = self.owner.read().upgrade() {
            item.set_parent(&owner);
        }
        item
    }

    /// Exact-match lookup by name
    pub fn find_by_name(&self, name: &str) -> Option<Arc<MetadataItem>> {
        self.items
            .read()
            .iter()
            .find(|item| item.name().equals(name))
            .cloned()
    }

    /// Exact-match lookup by numeric metadata id
    pub fn find_by_metadata_id(&self, id: i64) -> Option<Arc<MetadataItem>> {
        self.items
            .read()
            .iter()
            .find(|item| item.metadata_id() == Some(id))
            .cloned()
    }

    /// Append one new empty item, e.g. after an observed CREATE
    pub fn insert(self: &Arc<Self>, name: Identifier) -> Arc<MetadataItem> {
        let item = self.new_item(name);
        self.items.write().push(item.clone());
        self.subject.notify();
        item
    }

    /// Remove by identity; used after an observed DROP
    pub fn remove(&self, item: &Arc<MetadataItem>) -> bool {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|existing| !Arc::ptr_eq(existing, item));
        let removed = items.len() != before;
        drop(items);
        if removed {
            self.subject.notify();
        }
        removed
    }

    /// Snapshot of the contained items, in insertion order
    pub fn items(&self) -> Vec<Arc<MetadataItem>> {
        self.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Drop every contained item (disconnect teardown)
    pub fn clear(&self) {
        self.items.write().clear();
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn attach_observer(&self, observer: &Arc<dyn MetadataObserver>) {
        self.subject.attach(observer);
    }

    pub fn notify_observers(&self) {
        self.subject.notify();
    }

    pub fn lock_subject(&self) {
        self.subject.lock();
    }

    pub fn unlock_subject(&self) {
        self.subject.unlock();
    }
}

impl std::fmt::Debug for MetadataCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCollection")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

/// The identifier seed query for a collection kind
pub(crate) fn seed_query(kind: ObjectKind, info: &ServerInfo) -> String {
    use ObjectKind::*;
    match kind {
        Tables | SystemTables | GlobalTemporaryTables | Views => relation::seed_query(kind, info),
        DmlTriggers | DbTriggers | DdlTriggers => trigger::seed_query(kind, info),
        Domains | SystemDomains => domain::seed_query(kind, info),
        Procedures => procedure::seed_query(kind, info),
        Functions | Udfs => function::seed_query(kind, info),
        Generators => generator::seed_query(kind, info),
        Exceptions => exception::seed_query(kind, info),
        Indices | SystemIndices => index::seed_query(kind, info),
        Packages | SystemPackages => package::seed_query(kind, info),
        Roles | SystemRoles => role::seed_query(kind, info),
        Users => user::seed_query(kind, info),
        Collations => collation::seed_query(kind, info),
        CharacterSets => charset::seed_query(kind, info),
        Schemas => schema::seed_query(kind, info),
        other => unreachable!("{:?} has no seed query", other),
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
