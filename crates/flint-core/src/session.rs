//! Server driver and session traits, capability info, credentials

use crate::{Result, Row, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capability snapshot of a connected server.
///
/// The on-disk-structure (ODS) version gates which metadata tables and
/// columns exist; every version-dependent query consults it through
/// [`ServerInfo::ods_at_least`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerInfo {
    /// On-disk-structure major version
    pub ods_major: u32,
    /// On-disk-structure minor version
    pub ods_minor: u32,
    /// Database page size in bytes
    pub page_size: i32,
    /// Number of allocated pages
    pub pages: i32,
    /// Page buffer count
    pub buffers: i32,
    /// Sweep interval
    pub sweep: i32,
    /// Forced writes enabled
    pub forced_writes: bool,
    /// Reserve space for record versions
    pub reserve: bool,
    /// Database is read-only
    pub read_only: bool,
    /// SQL dialect (1 or 3)
    pub dialect: i32,
    /// Oldest interesting transaction
    pub oldest_transaction: i32,
    /// Oldest active transaction
    pub oldest_active_transaction: i32,
    /// Oldest snapshot transaction
    pub oldest_snapshot: i32,
    /// Next transaction number
    pub next_transaction: i32,
}

impl ServerInfo {
    /// On-disk-structure major version
    pub fn ods(&self) -> u32 {
        self.ods_major
    }

    /// Combined version for display, e.g. ODS 11.2 -> 112
    pub fn full_ods(&self) -> u32 {
        self.ods_major * 10 + self.ods_minor
    }

    /// Check the ODS major version against a threshold
    pub fn ods_at_least_major(&self, major: u32) -> bool {
        self.ods_major >= major
    }

    /// Check the ODS major.minor version against a threshold
    pub fn ods_at_least(&self, major: u32, minor: u32) -> bool {
        self.ods_major > major || (self.ods_major == major && self.ods_minor >= minor)
    }

    /// Total database size derived from page count and page size
    pub fn size_in_bytes(&self) -> i64 {
        self.pages as i64 * self.page_size as i64
    }
}

/// Which password source is used when (re)connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMode {
    /// Password stored as entered
    #[default]
    UseSavedPassword,
    /// Password stored in encrypted form
    UseSavedEncryptedPwd,
    /// Never store, prompt on every connect
    AlwaysEnterPassword,
    /// Trusted/OS authentication, no username or password sent
    TrustedUser,
}

impl AuthenticationMode {
    /// Short token used in saved configuration files
    pub fn config_value(&self) -> &'static str {
        match self {
            AuthenticationMode::UseSavedPassword => "pwd",
            AuthenticationMode::UseSavedEncryptedPwd => "encpwd",
            AuthenticationMode::AlwaysEnterPassword => "askpwd",
            AuthenticationMode::TrustedUser => "trusted",
        }
    }

    /// Parse the configuration token; unknown tokens fall back to the default
    pub fn from_config_value(value: &str) -> Self {
        match value {
            "encpwd" => AuthenticationMode::UseSavedEncryptedPwd,
            "askpwd" => AuthenticationMode::AlwaysEnterPassword,
            "trusted" => AuthenticationMode::TrustedUser,
            _ => AuthenticationMode::UseSavedPassword,
        }
    }

    /// The user must be prompted for the password on every connect
    pub fn always_asks_for_password(&self) -> bool {
        matches!(self, AuthenticationMode::AlwaysEnterPassword)
    }

    /// Username and password are not sent at all
    pub fn ignores_username_password(&self) -> bool {
        matches!(self, AuthenticationMode::TrustedUser)
    }

    /// The stored password is in encrypted form
    pub fn uses_encrypted_password(&self) -> bool {
        matches!(self, AuthenticationMode::UseSavedEncryptedPwd)
    }
}

/// Login data for one connection attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub role: String,
    pub charset: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: String::new(),
            charset: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }
}

/// Where a database lives: server address plus on-server path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Display name; derived from the path when empty
    pub name: String,
    /// Server address, e.g. "localhost" or "db.example.com/3051";
    /// empty for an embedded database
    pub server: String,
    /// Database path or alias on the server
    pub path: String,
}

impl ConnectionProfile {
    pub fn new(name: impl Into<String>, server: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            path: path.into(),
        }
    }

    /// Full connection string: "server:path", or just the path for
    /// embedded databases
    pub fn connection_string(&self) -> String {
        if self.server.is_empty() {
            self.path.clone()
        } else {
            format!("{}:{}", self.server, self.path)
        }
    }

    /// Derive a display name from a connection path: the file stem of
    /// the last path segment
    pub fn extract_name_from_connection_string(path: &str) -> String {
        let mut name = path;
        if let Some(pos) = name.rfind(['/', '\\', ':']) {
            name = &name[pos + 1..];
        }
        match name.rfind('.') {
            Some(pos) => name[..pos].to_string(),
            None => name.to_string(),
        }
    }

    /// Effective display name
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            Self::extract_name_from_connection_string(&self.path)
        } else {
            self.name.clone()
        }
    }
}

/// An open metadata session: the opaque transactional data-access API.
///
/// One session spans the lifetime of a connection. Metadata loads run
/// inside explicit transactions bracketed by `begin`/`commit` so that a
/// whole collection batch observes a single transactional snapshot.
#[async_trait]
pub trait MetadataSession: Send + Sync {
    /// Run a query and fetch all rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Start a metadata-loading transaction
    async fn begin(&self) -> Result<()>;

    /// Commit the current metadata-loading transaction
    async fn commit(&self) -> Result<()>;

    /// Fetch the capability snapshot for the connected server
    async fn server_info(&self) -> Result<ServerInfo>;

    /// Close the session and release server resources
    async fn close(&self) -> Result<()>;

    /// Check if the session has been closed
    fn is_closed(&self) -> bool;
}

/// Factory for metadata sessions; the only thing flint knows about the
/// wire protocol
#[async_trait]
pub trait ServerDriver: Send + Sync {
    /// Driver identifier, e.g. "firebird"
    fn name(&self) -> &'static str;

    /// Open a session against the given database
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        credentials: &Credentials,
    ) -> Result<Arc<dyn MetadataSession>>;
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
