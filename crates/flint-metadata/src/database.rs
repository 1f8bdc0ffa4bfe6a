//! The database aggregate root
//!
//! Owns the connection state machine, the capability snapshot, the
//! credentials, and the top-level container of collections. The
//! handshake runs on a background task so the foreground can poll a
//! cancellation flag; a handshake cannot be aborted midway, so a result
//! that materializes after cancellation is discarded and the orphaned
//! session force-closed.

use crate::collection::MetadataCollection;
use crate::container::MetadataContainer;
use crate::identifier::Identifier;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use crate::loader::MetadataLoader;
use crate::relation;
use crate::subject::{MetadataObserver, SubjectGuard};
use crate::trigger;
use flint_core::keys;
use flint_core::{
    allocate_database_id, check_canceled, seed_database_ids, AuthenticationMode, ConnectionProfile,
    Credentials, FlintError, MetadataSession, ProgressIndicator, Result, ServerDriver, ServerInfo,
    Settings, Value,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// How often the foreground polls the background handshake
const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long a capability snapshot stays fresh
const INFO_STALENESS: Duration = Duration::from_secs(1);

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Scalar properties of the database itself
#[derive(Debug, Default)]
pub struct DatabaseProps {
    pub default_charset: Option<String>,
    pub connection_user: Option<String>,
    pub connection_role: Option<String>,
    pub linger: i32,
    pub sql_security: Option<String>,
}

/// One named timezone from the server's timezone table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneInfo {
    pub id: i32,
    pub name: String,
}

struct InfoSnapshot {
    info: ServerInfo,
    loaded_at: Instant,
}

/// The aggregate root of one database's metadata model
pub struct Database {
    id: u32,
    driver: Arc<dyn ServerDriver>,
    settings: Arc<Settings>,
    profile: RwLock<ConnectionProfile>,
    credentials: RwLock<Credentials>,
    temporary_credentials: RwLock<Option<Credentials>>,
    authentication_mode: RwLock<AuthenticationMode>,
    state: RwLock<ConnectionState>,
    loader: RwLock<Option<Arc<MetadataLoader>>>,
    info: RwLock<Option<InfoSnapshot>>,
    default_timezone: RwLock<Option<TimezoneInfo>>,
    timezones: RwLock<Vec<TimezoneInfo>>,
    container: RwLock<Arc<MetadataContainer>>,
    /// The database is itself a metadata item: tree root, observer
    /// subject, parent of every top-level item
    root: Arc<MetadataItem>,
}

impl Database {
    /// Register a database; no connection is made
    pub fn new(
        profile: ConnectionProfile,
        driver: Arc<dyn ServerDriver>,
        settings: Arc<Settings>,
    ) -> Arc<Database> {
        let name = Identifier::new(profile.display_name());
        Arc::new(Database {
            id: allocate_database_id(),
            driver,
            settings,
            profile: RwLock::new(profile),
            credentials: RwLock::new(Credentials::default()),
            temporary_credentials: RwLock::new(None),
            authentication_mode: RwLock::new(AuthenticationMode::default()),
            state: RwLock::new(ConnectionState::Disconnected),
            loader: RwLock::new(None),
            info: RwLock::new(None),
            default_timezone: RwLock::new(None),
            timezones: RwLock::new(Vec::new()),
            container: RwLock::new(Arc::new(MetadataContainer::new())),
            root: MetadataItem::new(ObjectKind::Database, name),
        })
    }

    /// Unique id, also the settings scope key
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Re-register a persisted id (keeps the process-wide generator ahead)
    pub fn restore_id(id: u32) {
        seed_database_ids(id);
    }

    pub fn name(&self) -> Identifier {
        self.root.name()
    }

    pub fn profile(&self) -> ConnectionProfile {
        self.profile.read().clone()
    }

    pub fn connection_string(&self) -> String {
        self.profile.read().connection_string()
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// The root metadata item (kind `Database`)
    pub fn root(&self) -> &Arc<MetadataItem> {
        &self.root
    }

    /// The top-level container; empty while disconnected
    pub fn container(&self) -> Arc<MetadataContainer> {
        self.container.read().clone()
    }

    // ========== Credentials ==========

    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write() = credentials;
    }

    pub fn authentication_mode(&self) -> AuthenticationMode {
        *self.authentication_mode.read()
    }

    pub fn set_authentication_mode(&self, mode: AuthenticationMode) {
        *self.authentication_mode.write() = mode;
    }

    /// Install a one-connection credential override, defaulting the
    /// charset from the saved credentials
    pub fn prepare_temporary_credentials(&self) {
        let charset = self.credentials.read().charset.clone();
        *self.temporary_credentials.write() =
            Some(Credentials::default().with_charset(charset));
    }

    pub fn set_temporary_credentials(&self, credentials: Credentials) {
        *self.temporary_credentials.write() = Some(credentials);
    }

    /// Forget the temporary username/password
    pub fn reset_credentials(&self) {
        *self.temporary_credentials.write() = None;
    }

    fn connection_credentials(&self, password_override: Option<&str>) -> Credentials {
        let mut credentials = self
            .temporary_credentials
            .read()
            .clone()
            .unwrap_or_else(|| self.credentials.read().clone());
        if let Some(password) = password_override {
            credentials.password = password.to_string();
        }
        if self.authentication_mode().ignores_username_password() {
            credentials.username.clear();
            credentials.password.clear();
        }
        credentials
    }

    /// Username plus connection string for display, e.g.
    /// "SYSDBA@localhost:/data/employee.fdb (UTF8)"
    pub fn connection_info_string(&self) -> String {
        let credentials = self.credentials();
        let username = if self.authentication_mode().ignores_username_password() {
            match self.database_properties().connection_user {
                Some(user) if self.is_connected() => format!("[{}]", user),
                _ => "[Trusted user]".to_string(),
            }
        } else {
            credentials.username.clone()
        };
        format!(
            "{}@{} ({})",
            username,
            self.connection_string(),
            credentials.charset
        )
    }

    // ========== State machine ==========

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Guard for metadata operations that need a live connection
    pub fn check_connected(&self, operation: &str) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(FlintError::NotConnected(operation.to_string()))
        }
    }

    /// The loader over the live session
    pub fn loader(&self) -> Result<Arc<MetadataLoader>> {
        self.loader
            .read()
            .clone()
            .ok_or_else(|| FlintError::NotConnected("metadata load".to_string()))
    }

    /// Open a session and build the whole metadata model.
    ///
    /// No-op when already connected. The handshake runs on a background
    /// task polled every 50 ms; user cancellation returns `Canceled`
    /// with the state rolled back to `Disconnected`, and a handshake
    /// that still succeeds later is closed by a detached drain task.
    /// Any failure after the session opened also rolls back and
    /// propagates.
    pub async fn connect(
        self: &Arc<Self>,
        password: Option<&str>,
        progress: &dyn ProgressIndicator,
    ) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        *self.state.write() = ConnectionState::Connecting;
        progress.init_indeterminate("Establishing connection...");

        let credentials = self.connection_credentials(password);
        let driver = self.driver.clone();
        let profile = self.profile();
        tracing::info!(database = %self.name(), connection = %profile.connection_string(), "connecting");

        let (tx, mut rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = driver.connect(&profile, &credentials).await;
            // the receiver may have given up; the drain task handles that
            let _ = tx.send(result);
        });

        let session = loop {
            match rx.try_recv() {
                Ok(result) => match result {
                    Ok(session) => break session,
                    Err(error) => {
                        tracing::warn!(error = %error, "connection failed");
                        *self.state.write() = ConnectionState::Disconnected;
                        return Err(error);
                    }
                },
                Err(oneshot::error::TryRecvError::Empty) => {
                    progress.step_progress();
                    if progress.is_canceled() {
                        // the handshake cannot be aborted midway; let it
                        // finish in the background and close the session
                        // it may still produce
                        tokio::spawn(async move {
                            if let Ok(Ok(stray)) = rx.await {
                                tracing::warn!("closing connection established after cancel");
                                let _ = stray.close().await;
                            }
                        });
                        *self.state.write() = ConnectionState::Disconnected;
                        return Err(FlintError::Canceled);
                    }
                    tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    *self.state.write() = ConnectionState::Disconnected;
                    return Err(FlintError::Connection(
                        "connection task terminated".to_string(),
                    ));
                }
            }
        };

        *self.loader.write() = Some(Arc::new(MetadataLoader::new(session)));
        *self.state.write() = ConnectionState::Connected;

        if let Err(error) = self.initial_load(progress).await {
            tracing::warn!(error = %error, "initial metadata load failed, rolling back");
            let _ = self.disconnect().await;
            return Err(error);
        }

        tracing::info!(database = %self.name(), "connected");
        self.notify_observers();
        Ok(())
    }

    /// Capability info, database properties, timezone tables, then the
    /// version-appropriate collection set and a full load, all inside
    /// one metadata transaction with one coalesced notification.
    async fn initial_load(self: &Arc<Self>, progress: &dyn ProgressIndicator) -> Result<()> {
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let result: Result<()> = {
            let _guard = SubjectGuard::new(self.root.subject());
            async {
                check_canceled(progress)?;
                let info = loader.session().server_info().await?;
                *self.info.write() = Some(InfoSnapshot {
                    info,
                    loaded_at: Instant::now(),
                });

                check_canceled(progress)?;
                self.root.set_properties_loaded(false);
                self.load_database_properties().await?;
                self.root.set_properties_loaded(true);

                self.load_default_timezone().await?;
                self.load_timezones().await?;

                self.root.set_children_loaded(false);
                self.configure_collections()?;
                self.container().load_collections(self, progress).await?;
                self.root.set_children_loaded(true);

                progress.init_progress("Complete", 1, 1, 1);
                Ok(())
            }
            .await
        };
        loader.detach_transaction().await?;
        result
    }

    /// Release the session and drop the whole cached model
    pub async fn disconnect(&self) -> Result<()> {
        if self.state() == ConnectionState::Disconnected {
            return Ok(());
        }
        let session = self.loader.read().clone().map(|l| l.session().clone());
        let close_result = match session {
            Some(session) => session.close().await,
            None => Ok(()),
        };
        self.set_disconnected();
        close_result
    }

    fn set_disconnected(&self) {
        tracing::info!(database = %self.name(), "disconnected");
        *self.loader.write() = None;
        *self.info.write() = None;
        *self.default_timezone.write() = None;
        self.timezones.write().clear();
        self.reset_credentials();
        *self.container.write() = Arc::new(MetadataContainer::new());
        self.root.invalidate();
        self.root
            .with_properties_mut(|props| *props = Properties::empty_for(ObjectKind::Database));
        *self.state.write() = ConnectionState::Disconnected;
        self.notify_observers();
    }

    // ========== Capability info ==========

    /// The cached capability snapshot
    pub fn server_info(&self) -> Result<ServerInfo> {
        self.info
            .read()
            .as_ref()
            .map(|snapshot| snapshot.info.clone())
            .ok_or_else(|| FlintError::NotConnected("server info".to_string()))
    }

    /// The capability snapshot, re-fetched when older than a second
    /// (transaction counters move constantly)
    pub async fn refreshed_server_info(&self) -> Result<ServerInfo> {
        let stale = self
            .info
            .read()
            .as_ref()
            .map(|snapshot| snapshot.loaded_at.elapsed() >= INFO_STALENESS)
            .unwrap_or(true);
        if stale {
            let loader = self.loader()?;
            let info = loader.session().server_info().await?;
            *self.info.write() = Some(InfoSnapshot {
                info,
                loaded_at: Instant::now(),
            });
        }
        self.server_info()
    }

    pub fn sql_dialect(&self) -> i32 {
        self.server_info().map(|info| info.dialect).unwrap_or(3)
    }

    // ========== System-object visibility settings ==========

    fn scope(&self) -> String {
        self.id.to_string()
    }

    fn show_setting(&self, key: &str, default: bool) -> bool {
        self.settings.get_bool(Some(&self.scope()), key, default)
    }

    pub fn show_system_character_sets(&self) -> bool {
        self.show_setting(keys::SHOW_SYSTEM_CHARACTER_SET, true)
    }

    pub fn show_system_domains(&self) -> bool {
        self.show_setting(keys::SHOW_SYSTEM_DOMAINS, true)
    }

    pub fn show_system_indices(&self) -> bool {
        self.show_setting(keys::SHOW_SYSTEM_INDICES, true)
    }

    pub fn show_system_packages(&self) -> bool {
        match self.server_info() {
            Ok(info) if info.ods_at_least(12, 0) => {
                self.show_setting(keys::SHOW_SYSTEM_PACKAGES, true)
            }
            _ => false,
        }
    }

    pub fn show_system_roles(&self) -> bool {
        match self.server_info() {
            Ok(info) if info.ods_at_least(11, 1) => {
                self.show_setting(keys::SHOW_SYSTEM_ROLES, true)
            }
            _ => false,
        }
    }

    pub fn show_system_tables(&self) -> bool {
        self.show_setting(keys::SHOW_SYSTEM_TABLES, true)
    }

    pub fn show_one_node_indices(&self) -> bool {
        self.show_setting(keys::SHOW_ONE_NODE_INDICES, false)
    }

    // ========== Collection composition ==========

    /// Build the version-appropriate collection set.
    ///
    /// Feature collections appear only when the server's ODS version
    /// supports them; system-object collections only when their
    /// visibility setting says so (consulted here, not filtered later).
    /// From ODS 14 on, most per-object collections live inside
    /// per-schema containers instead of the top level.
    pub fn configure_collections(self: &Arc<Self>) -> Result<()> {
        let info = self.server_info()?;
        let container = Arc::new(MetadataContainer::new());
        let root = &self.root;
        let add = |kind: ObjectKind| container.add_collection(MetadataCollection::new(kind, root));

        if info.ods() < 14 {
            add(ObjectKind::CharacterSets);
            add(ObjectKind::Collations);
            if info.ods_at_least(11, 1) {
                add(ObjectKind::DbTriggers);
            }
            if info.ods_at_least(12, 0) {
                add(ObjectKind::DdlTriggers);
            }
            add(ObjectKind::Domains);
            add(ObjectKind::Exceptions);
            if info.ods_at_least(12, 0) {
                add(ObjectKind::Functions);
            }
            add(ObjectKind::Generators);
            if info.ods_at_least(11, 1) {
                add(ObjectKind::GlobalTemporaryTables);
            }
            if self.show_one_node_indices() && self.show_system_indices() {
                // single node listing every index, system ones included
                container.add_collection(MetadataCollection::with_seed_query(
                    ObjectKind::Indices,
                    root,
                    "select rdb$index_name from rdb$indices order by 1",
                ));
            } else {
                add(ObjectKind::Indices);
            }
            if info.ods_at_least(12, 0) {
                add(ObjectKind::Packages);
            }
            add(ObjectKind::Procedures);
        }

        add(ObjectKind::Roles);

        if info.ods() < 14 {
            if self.show_system_packages() {
                add(ObjectKind::SystemPackages);
            }
            if self.show_system_domains() {
                add(ObjectKind::SystemDomains);
            }
            if self.show_system_indices() && !self.show_one_node_indices() {
                add(ObjectKind::SystemIndices);
            }
            if self.show_system_roles() {
                add(ObjectKind::SystemRoles);
            }
            if self.show_system_tables() {
                add(ObjectKind::SystemTables);
            }
            add(ObjectKind::Tables);
            add(ObjectKind::DmlTriggers);
            add(ObjectKind::Udfs);
        }

        add(ObjectKind::Users);

        if info.ods() < 14 {
            add(ObjectKind::Views);
        }
        if info.ods_at_least(14, 0) {
            add(ObjectKind::Schemas);
        }

        *self.container.write() = container;
        Ok(())
    }

    // ========== Metadata access ==========

    /// The top-level collection with a given tag
    pub fn collection(&self, kind: ObjectKind) -> Option<Arc<MetadataCollection>> {
        self.container().collection(kind)
    }

    /// Run an identifier seed query, checking cancellation per row
    pub async fn load_identifiers(
        &self,
        sql: &str,
        progress: &dyn ProgressIndicator,
    ) -> Result<Vec<Identifier>> {
        check_canceled(progress)?;
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query(sql, &[]).await;
        loader.detach_transaction().await?;

        let mut names = Vec::new();
        for row in fetched? {
            check_canceled(progress)?;
            if let Some(name) = row.trimmed_text(0) {
                names.push(Identifier::new(name));
            }
        }
        Ok(names)
    }

    /// Scalar properties of the database row itself; columns missing on
    /// older servers degrade to null placeholders in the SQL text
    pub async fn load_database_properties(&self) -> Result<()> {
        let info = self.server_info()?;
        let mut sql =
            String::from("select rdb$character_set_name, current_user, current_role, ");
        sql += if info.ods_at_least(12, 0) {
            " rdb$linger, "
        } else {
            " null, "
        };
        sql += if info.ods_at_least(13, 0) {
            " rdb$sql_security "
        } else {
            " null "
        };
        sql += " from rdb$database ";

        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query_one(&sql, &[]).await;
        loader.detach_transaction().await?;

        if let Some(row) = fetched? {
            let mut props = DatabaseProps {
                default_charset: row.trimmed_text(0),
                connection_user: row.trimmed_text(1),
                connection_role: row.trimmed_text(2),
                linger: row.int(3).unwrap_or(0),
                sql_security: row
                    .bool(4)
                    .map(|b| relation::sql_security_text(b).to_string()),
            };
            if props.connection_role.as_deref() == Some("NONE") {
                props.connection_role = None;
            }
            self.root.with_properties_mut(|payload| {
                *payload = Properties::Database(props);
            });
        }
        Ok(())
    }

    /// Snapshot of the database's own scalar properties
    pub fn database_properties(&self) -> DatabaseProps {
        self.root.with_properties(|props| match props {
            Properties::Database(p) => DatabaseProps {
                default_charset: p.default_charset.clone(),
                connection_user: p.connection_user.clone(),
                connection_role: p.connection_role.clone(),
                linger: p.linger,
                sql_security: p.sql_security.clone(),
            },
            _ => DatabaseProps::default(),
        })
    }

    // ========== Timezones (ODS 13+) ==========

    pub async fn load_default_timezone(&self) -> Result<()> {
        let info = self.server_info()?;
        if !info.ods_at_least(13, 0) {
            return Ok(());
        }
        let sql = "select z.rdb$time_zone_id, \
                   z.rdb$time_zone_name \
                   from rdb$time_zones z \
                   where z.rdb$time_zone_name = rdb$get_context('SYSTEM', 'SESSION_TIMEZONE')";
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query_one(sql, &[]).await;
        loader.detach_transaction().await?;

        if let Some(row) = fetched?
            && let (Some(id), Some(name)) = (row.int(0), row.trimmed_text(1))
        {
            *self.default_timezone.write() = Some(TimezoneInfo { id, name });
        }
        Ok(())
    }

    pub async fn load_timezones(&self) -> Result<()> {
        let info = self.server_info()?;
        if !info.ods_at_least(13, 0) {
            return Ok(());
        }
        let sql = "select z.rdb$time_zone_id, \
                   z.rdb$time_zone_name \
                   from rdb$time_zones z";
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query(sql, &[]).await;
        loader.detach_transaction().await?;

        let zones: Vec<TimezoneInfo> = fetched?
            .iter()
            .filter_map(|row| {
                match (row.int(0), row.trimmed_text(1)) {
                    (Some(id), Some(name)) => Some(TimezoneInfo { id, name }),
                    _ => None,
                }
            })
            .collect();
        *self.timezones.write() = zones;
        Ok(())
    }

    pub fn default_timezone(&self) -> Option<TimezoneInfo> {
        self.default_timezone.read().clone()
    }

    /// Resolve a timezone id to its name, with a numeric fallback for
    /// ids the table does not know
    pub fn timezone_name(&self, timezone: i32) -> String {
        self.timezones
            .read()
            .iter()
            .find(|zone| zone.id == timezone)
            .map(|zone| zone.name.clone())
            .unwrap_or_else(|| format!("TZ {}", timezone))
    }

    // ========== Lookups ==========

    /// Find an item by its kind and name; kind `Database` resolves to
    /// the root item
    pub fn find_by_kind_and_name(&self, kind: ObjectKind, name: &str) -> Option<Arc<MetadataItem>> {
        if !self.is_connected() {
            return None;
        }
        if kind == ObjectKind::Database {
            return Some(self.root.clone());
        }
        self.container()
            .find_by_kind_and_name(kind.collection_kind()?, name)
    }

    /// Resolve a relation name: tables, then global temporary tables,
    /// then views, then system tables
    pub fn find_relation(&self, name: &Identifier) -> Option<Arc<MetadataItem>> {
        self.container().find_relation(name)
    }

    /// The domain with a given name, in the system or user collection
    pub fn find_domain(&self, name: &Identifier) -> Option<Arc<MetadataItem>> {
        self.container().find_domain(name)
    }

    /// Find an item of any kind by name, first matching collection wins
    pub fn find_by_name(&self, name: &str) -> Option<Arc<MetadataItem>> {
        if !self.is_connected() {
            return None;
        }
        self.container()
            .collections()
            .iter()
            .find_map(|collection| collection.find_by_name(name))
    }

    /// The character set with a given numeric id; a combined
    /// charset+collation id carries the charset in its low byte
    pub fn charset_by_id(&self, id: i64) -> Option<Arc<MetadataItem>> {
        self.container()
            .find_by_kind_and_id(ObjectKind::CharacterSets, id % 256)
    }

    /// Collation names available for one character set
    pub async fn collations_for_charset(self: &Arc<Self>, charset: &str) -> Result<Vec<Identifier>> {
        let Some(item) = self
            .container()
            .find_by_kind_and_name(ObjectKind::CharacterSets, charset)
        else {
            return Ok(Vec::new());
        };
        item.ensure_children_loaded(self).await?;
        Ok(crate::charset::collation_names(&item))
    }

    /// Whether a collation is the character set's default one
    pub async fn is_default_collation(
        self: &Arc<Self>,
        charset: &str,
        collation: &str,
    ) -> Result<bool> {
        let Some(item) = self
            .container()
            .find_by_kind_and_name(ObjectKind::CharacterSets, charset)
        else {
            return Ok(false);
        };
        item.ensure_properties_loaded(self).await?;
        Ok(crate::charset::default_collation(&item).as_deref() == Some(collation))
    }

    /// The owning relation of a loaded DML trigger
    pub fn relation_for_trigger(&self, trigger_item: &MetadataItem) -> Option<Arc<MetadataItem>> {
        let name = trigger::relation_name(trigger_item)?;
        self.find_relation(&name)
    }

    /// The trigger's relation name, loading the trigger's properties if
    /// needed; `None` when the relation is unresolvable
    pub async fn relation_name_for_trigger(
        self: &Arc<Self>,
        trigger_item: &Arc<MetadataItem>,
    ) -> Option<Identifier> {
        if !trigger_item.properties_loaded() {
            // the trigger row may be gone already; an unresolvable
            // relation is reported as None
            let _ = trigger_item.ensure_properties_loaded(self).await;
        }
        trigger::relation_name(trigger_item)
    }

    /// Which relation an index belongs to, straight from the server
    pub async fn relation_name_for_index(&self, index_name: &str) -> Result<Option<Identifier>> {
        let sql = "select rdb$relation_name from rdb$indices where rdb$index_name = ?";
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let fetched = loader.query_one(sql, &[Value::from(index_name)]).await;
        loader.detach_transaction().await?;
        Ok(fetched?
            .and_then(|row| row.trimmed_text(0))
            .map(Identifier::new))
    }

    /// Remove a dropped object from its owning collection
    pub fn drop_object(&self, item: &Arc<MetadataItem>) -> bool {
        self.container().drop_object(item)
    }

    /// Insert an empty placeholder after an observed CREATE
    pub fn add_object(&self, kind: ObjectKind, name: Identifier) -> Option<Arc<MetadataItem>> {
        self.container().add_object(kind, name)
    }

    /// Invalidate and re-fetch every generator's current value under one
    /// transaction and one coalesced notification
    pub async fn load_generator_values(self: &Arc<Self>) -> Result<()> {
        let Some(generators) = self.collection(ObjectKind::Generators) else {
            return Ok(());
        };
        let loader = self.loader()?;
        loader.attach_transaction().await?;
        let result: Result<()> = {
            let _guard = SubjectGuard::new(self.root.subject());
            let mut outcome = Ok(());
            for generator in generators.items() {
                generator.invalidate();
                if let Err(error) = ignore_missing(generator.ensure_properties_loaded(self).await) {
                    outcome = Err(error);
                    break;
                }
            }
            outcome
        };
        loader.detach_transaction().await?;
        result
    }

    // ========== Observers ==========

    pub fn attach_observer(&self, observer: &Arc<dyn MetadataObserver>) {
        self.root.attach_observer(observer);
    }

    pub fn detach_observer(&self, observer: &Arc<dyn MetadataObserver>) {
        self.root.detach_observer(observer);
    }

    pub fn notify_observers(&self) {
        self.root.notify_observers();
    }

    /// Defer notifications on the root and every top-level collection
    pub fn lock_children(&self) {
        self.root.lock_subject();
        self.container().lock_subject();
    }

    pub fn unlock_children(&self) {
        self.container().unlock_subject();
        self.root.unlock_subject();
    }
}

/// Treat a vanished object as acceptable; all other errors propagate
pub(crate) fn ignore_missing(result: Result<()>) -> Result<()> {
    match result {
        Err(error) if error.is_object_not_found() => Ok(()),
        other => other,
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("id", &self.id)
            .field("name", &self.name().get())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
