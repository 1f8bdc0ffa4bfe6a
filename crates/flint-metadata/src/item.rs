//! The base metadata entity
//!
//! Every schema object is one `MetadataItem`: a kind tag, a name, load
//! flags, an observer subject and a kind-specific property payload.
//! Items are created empty when their collection discovers the name;
//! scalar properties and children load lazily on first access and stay
//! cached until `invalidate`. Invalidation never removes the item from
//! its collection, so handles held by the UI stay valid.

use crate::charset::CharacterSetProps;
use crate::collation::CollationProps;
use crate::database::{Database, DatabaseProps};
use crate::domain::DomainProps;
use crate::exception::ExceptionProps;
use crate::function::FunctionProps;
use crate::generator::GeneratorProps;
use crate::identifier::Identifier;
use crate::index::IndexProps;
use crate::kinds::ObjectKind;
use crate::package::PackageProps;
use crate::procedure::ProcedureProps;
use crate::relation::{ColumnProps, RelationProps};
use crate::role::RoleProps;
use crate::schema::SchemaProps;
use crate::subject::{MetadataObserver, Subject};
use crate::trigger::TriggerProps;
use crate::user::UserProps;
use crate::{charset, collation, domain, exception, function, generator, index, package, procedure,
    relation, role, schema, trigger, user};
use flint_core::{FlintError, Result, Row, ServerInfo, Value};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Kind-specific property payload.
///
/// One closed variant set instead of an inheritance hierarchy; behavior
/// that differs between server versions branches on the capability
/// snapshot inside each kind's loader, not on the type.
#[derive(Debug)]
pub enum Properties {
    None,
    Database(DatabaseProps),
    Schema(SchemaProps),
    Relation(RelationProps),
    Column(ColumnProps),
    Trigger(TriggerProps),
    Domain(DomainProps),
    Procedure(ProcedureProps),
    Function(FunctionProps),
    Generator(GeneratorProps),
    Exception(ExceptionProps),
    Index(IndexProps),
    Package(PackageProps),
    Role(RoleProps),
    User(UserProps),
    Collation(CollationProps),
    CharacterSet(CharacterSetProps),
}

impl Properties {
    /// The unloaded payload for a given kind
    pub fn empty_for(kind: ObjectKind) -> Properties {
        use ObjectKind::*;
        match kind {
            Database => Properties::Database(DatabaseProps::default()),
            Schema => Properties::Schema(SchemaProps::default()),
            Table | SystemTable | GlobalTemporaryTable | View => {
                Properties::Relation(RelationProps::default())
            }
            Column => Properties::Column(ColumnProps::default()),
            DmlTrigger | DbTrigger | DdlTrigger => Properties::Trigger(TriggerProps::default()),
            Domain | SystemDomain => Properties::Domain(DomainProps::default()),
            Procedure => Properties::Procedure(ProcedureProps::default()),
            Function | Udf => Properties::Function(FunctionProps::default()),
            Generator => Properties::Generator(GeneratorProps::default()),
            Exception => Properties::Exception(ExceptionProps::default()),
            Index | SystemIndex => Properties::Index(IndexProps::default()),
            Package | SystemPackage => Properties::Package(PackageProps::default()),
            Role | SystemRole => Properties::Role(RoleProps::default()),
            User => Properties::User(UserProps::default()),
            Collation => Properties::Collation(CollationProps::default()),
            CharacterSet => Properties::CharacterSet(CharacterSetProps::default()),
            _ => Properties::None,
        }
    }
}

#[derive(Default)]
struct LoadFlags {
    properties_loaded: bool,
    children_loaded: bool,
}

/// One schema object
pub struct MetadataItem {
    kind: ObjectKind,
    name: RwLock<Identifier>,
    metadata_id: RwLock<Option<i64>>,
    parent: RwLock<Weak<MetadataItem>>,
    system: AtomicBool,
    flags: Mutex<LoadFlags>,
    /// Outer `None`: description not fetched yet
    description: RwLock<Option<Option<String>>>,
    subject: Subject,
    properties: RwLock<Properties>,
}

impl MetadataItem {
    /// Create an empty item: name known, nothing loaded
    pub fn new(kind: ObjectKind, name: Identifier) -> Arc<MetadataItem> {
        let system = kind.is_system() || name.has_system_prefix();
        Arc::new(MetadataItem {
            kind,
            name: RwLock::new(name),
            metadata_id: RwLock::new(None),
            parent: RwLock::new(Weak::new()),
            system: AtomicBool::new(system),
            flags: Mutex::new(LoadFlags::default()),
            description: RwLock::new(None),
            subject: Subject::new(),
            properties: RwLock::new(Properties::empty_for(kind)),
        })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn name(&self) -> Identifier {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: Identifier) {
        *self.name.write() = name;
        self.notify_observers();
    }

    /// SQL rendering of the name, quoted only when required
    pub fn quoted_name(&self) -> String {
        self.name.read().quoted()
    }

    pub fn metadata_id(&self) -> Option<i64> {
        *self.metadata_id.read()
    }

    pub fn set_metadata_id(&self, id: Option<i64>) {
        *self.metadata_id.write() = id;
    }

    pub fn parent(&self) -> Option<Arc<MetadataItem>> {
        self.parent.read().upgrade()
    }

    pub fn set_parent(&self, parent: &Arc<MetadataItem>) {
        *self.parent.write() = Arc::downgrade(parent);
    }

    pub fn is_system(&self) -> bool {
        self.system.load(Ordering::Relaxed)
    }

    pub fn set_system(&self, system: bool) {
        self.system.store(system, Ordering::Relaxed);
    }

    pub fn properties_loaded(&self) -> bool {
        self.flags.lock().properties_loaded
    }

    pub fn set_properties_loaded(&self, loaded: bool) {
        self.flags.lock().properties_loaded = loaded;
    }

    pub fn children_loaded(&self) -> bool {
        self.flags.lock().children_loaded
    }

    pub fn set_children_loaded(&self, loaded: bool) {
        self.flags.lock().children_loaded = loaded;
    }

    /// Drop cached state so the next access re-fetches. The item stays
    /// in its collection; external references remain valid.
    pub fn invalidate(&self) {
        let mut flags = self.flags.lock();
        flags.properties_loaded = false;
        flags.children_loaded = false;
        drop(flags);
        *self.description.write() = None;
    }

    /// Drop only the cached COMMENT text
    pub fn invalidate_description(&self) {
        *self.description.write() = None;
    }

    /// Cached description, if it has been fetched
    pub fn cached_description(&self) -> Option<Option<String>> {
        self.description.read().clone()
    }

    /// Read the payload under the lock
    pub fn with_properties<R>(&self, f: impl FnOnce(&Properties) -> R) -> R {
        f(&self.properties.read())
    }

    /// Mutate the payload under the lock
    pub fn with_properties_mut<R>(&self, f: impl FnOnce(&mut Properties) -> R) -> R {
        f(&mut self.properties.write())
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn attach_observer(&self, observer: &Arc<dyn MetadataObserver>) {
        self.subject.attach(observer);
    }

    pub fn detach_observer(&self, observer: &Arc<dyn MetadataObserver>) {
        self.subject.detach(observer);
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

    /// Load scalar properties unless already loaded
    pub async fn ensure_properties_loaded(&self, db: &Arc<Database>) -> Result<()> {
        if self.properties_loaded() {
            return Ok(());
        }
        self.load_properties(db).await
    }

    /// Fetch scalar properties from the server.
    ///
    /// A name still listed in a collection can be gone server-side by
    /// the time the detail query runs; that case clears the payload,
    /// marks the item loaded, notifies observers and surfaces
    /// `ObjectNotFound` to the caller.
    pub async fn load_properties(&self, db: &Arc<Database>) -> Result<()> {
        let info = db.server_info()?;
        let Some((sql, params)) = self.build_properties_query(&info) else {
            self.set_properties_loaded(true);
            return Ok(());
        };

        let loader = db.loader()?;
        self.set_properties_loaded(false);
        loader.attach_transaction().await?;
        let fetched = loader.query(&sql, &params).await;
        loader.detach_transaction().await?;
        let rows = fetched?;

        if rows.is_empty() {
            // dropped server-side between listing and detail fetch
            tracing::warn!(name = %self.name(), kind = ?self.kind, "object vanished, clearing");
            self.with_properties_mut(|props| *props = Properties::empty_for(self.kind));
            self.set_properties_loaded(true);
            self.notify_observers();
            return Err(FlintError::ObjectNotFound(self.name().get().to_string()));
        }

        let id = self.with_properties_mut(|props| apply_rows(props, &rows));
        if id.is_some() {
            self.set_metadata_id(id);
        }
        self.set_properties_loaded(true);
        self.notify_observers();
        Ok(())
    }

    /// Load owned child lists unless already loaded
    pub async fn ensure_children_loaded(self: &Arc<Self>, db: &Arc<Database>) -> Result<()> {
        if self.children_loaded() {
            return Ok(());
        }
        self.load_children(db).await
    }

    /// Fetch owned child lists from the server
    pub async fn load_children(self: &Arc<Self>, db: &Arc<Database>) -> Result<()> {
        match self.kind {
            k if k.is_relation() => relation::load_columns(self, db).await?,
            ObjectKind::CharacterSet => charset::load_collations(self, db).await?,
            _ => {}
        }
        self.set_children_loaded(true);
        self.notify_observers();
        Ok(())
    }

    /// Fetch (and cache) the object's COMMENT text
    pub async fn description(&self, db: &Arc<Database>) -> Result<Option<String>> {
        if let Some(cached) = self.cached_description() {
            return Ok(cached);
        }
        let Some((table, column)) = description_source(self.kind) else {
            return Ok(None);
        };
        let sql = format!(
            "select rdb$description from {} where {} = ?",
            table, column
        );
        let loader = db.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query(&sql, &[Value::from(self.name().get())]).await;
        loader.detach_transaction().await?;
        let description = fetched?
            .first()
            .and_then(|row| row.text(0).map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty());
        *self.description.write() = Some(description.clone());
        Ok(description)
    }

    fn build_properties_query(&self, info: &ServerInfo) -> Option<(String, Vec<Value>)> {
        use ObjectKind::*;
        match self.kind {
            Table | SystemTable | GlobalTemporaryTable | View => {
                relation::properties_query(self, info)
            }
            Column => relation::column_properties_query(self, info),
            DmlTrigger | DbTrigger | DdlTrigger => trigger::properties_query(self, info),
            Domain | SystemDomain => domain::properties_query(self, info),
            Procedure => procedure::properties_query(self, info),
            Function | Udf => function::properties_query(self, info),
            Generator => generator::properties_query(self, info),
            Exception => exception::properties_query(self, info),
            Index | SystemIndex => index::properties_query(self, info),
            Package | SystemPackage => package::properties_query(self, info),
            Role | SystemRole => role::properties_query(self, info),
            User => user::properties_query(self, info),
            Collation => collation::properties_query(self, info),
            CharacterSet => charset::properties_query(self, info),
            Schema => schema::properties_query(self, info),
            // the Database aggregate loads its own properties
            _ => None,
        }
    }
}

fn apply_rows(props: &mut Properties, rows: &[Row]) -> Option<i64> {
    let first = &rows[0];
    match props {
        Properties::Relation(p) => relation::apply_row(p, first),
        Properties::Column(p) => relation::apply_column_row(p, first),
        Properties::Trigger(p) => trigger::apply_row(p, first),
        Properties::Domain(p) => domain::apply_row(p, first),
        Properties::Procedure(p) => procedure::apply_row(p, first),
        Properties::Function(p) => function::apply_row(p, first),
        Properties::Generator(p) => generator::apply_row(p, first),
        Properties::Exception(p) => exception::apply_row(p, first),
        Properties::Index(p) => index::apply_rows(p, rows),
        Properties::Package(p) => package::apply_row(p, first),
        Properties::Role(p) => role::apply_row(p, first),
        Properties::User(p) => user::apply_row(p, first),
        Properties::Collation(p) => collation::apply_row(p, first),
        Properties::CharacterSet(p) => charset::apply_row(p, first),
        Properties::Schema(p) => schema::apply_row(p, first),
        _ => None,
    }
}

/// System table and name column holding each kind's COMMENT text
fn description_source(kind: ObjectKind) -> Option<(&'static str, &'static str)> {
    use ObjectKind::*;
    match kind {
        Table | SystemTable | GlobalTemporaryTable | View => {
            Some(("rdb$relations", "rdb$relation_name"))
        }
        DmlTrigger | DbTrigger | DdlTrigger => Some(("rdb$triggers", "rdb$trigger_name")),
        Domain | SystemDomain => Some(("rdb$fields", "rdb$field_name")),
        Procedure => Some(("rdb$procedures", "rdb$procedure_name")),
        Function | Udf => Some(("rdb$functions", "rdb$function_name")),
        Generator => Some(("rdb$generators", "rdb$generator_name")),
        Exception => Some(("rdb$exceptions", "rdb$exception_name")),
        Index | SystemIndex => Some(("rdb$indices", "rdb$index_name")),
        Package | SystemPackage => Some(("rdb$packages", "rdb$package_name")),
        Role | SystemRole => Some(("rdb$roles", "rdb$role_name")),
        Collation => Some(("rdb$collations", "rdb$collation_name")),
        CharacterSet => Some(("rdb$character_sets", "rdb$character_set_name")),
        Schema => Some(("rdb$schemas", "rdb$schema_name")),
        _ => None,
    }
}

impl std::fmt::Debug for MetadataItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataItem")
            .field("kind", &self.kind)
            .field("name", &self.name.read().get())
            .field("properties_loaded", &self.properties_loaded())
            .field("children_loaded", &self.children_loaded())
            .finish()
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
