//! Per-database and global settings
//!
//! Lookup order is: per-database value, then global value, then the
//! coded default supplied by the caller. Visibility of system-object
//! collections is configured here, consulted when the collection set is
//! composed rather than filtered afterwards.

use crate::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Setting keys for system-object visibility, one per collection kind
pub mod keys {
    pub const SHOW_SYSTEM_CHARACTER_SET: &str = "ShowSystemCharacterSet";
    pub const SHOW_SYSTEM_DOMAINS: &str = "ShowSystemDomains";
    pub const SHOW_SYSTEM_INDICES: &str = "ShowSystemIndices";
    pub const SHOW_SYSTEM_PACKAGES: &str = "ShowSystemPackages";
    pub const SHOW_SYSTEM_ROLES: &str = "ShowSystemRoles";
    pub const SHOW_SYSTEM_TABLES: &str = "ShowSystemTables";
    pub const SHOW_ONE_NODE_INDICES: &str = "ShowOneNodeIndices";
}

/// A stored setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    global: HashMap<String, SettingValue>,
    /// Keyed by database id (stringified unique id)
    #[serde(default)]
    databases: HashMap<String, HashMap<String, SettingValue>>,
}

/// Key-value settings store with per-database scoping
#[derive(Debug, Default)]
pub struct Settings {
    data: RwLock<SettingsData>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a boolean: database scope first, then global, then `default`
    pub fn get_bool(&self, database: Option<&str>, key: &str, default: bool) -> bool {
        match self.get(database, key) {
            Some(SettingValue::Bool(b)) => b,
            Some(SettingValue::Int(i)) => i != 0,
            _ => default,
        }
    }

    /// Look up a string: database scope first, then global, then `default`
    pub fn get_string(&self, database: Option<&str>, key: &str, default: &str) -> String {
        match self.get(database, key) {
            Some(SettingValue::Text(s)) => s,
            _ => default.to_string(),
        }
    }

    fn get(&self, database: Option<&str>, key: &str) -> Option<SettingValue> {
        let data = self.data.read();
        if let Some(db) = database
            && let Some(scoped) = data.databases.get(db)
            && let Some(value) = scoped.get(key)
        {
            return Some(value.clone());
        }
        data.global.get(key).cloned()
    }

    /// Set a global value
    pub fn set_global(&self, key: &str, value: impl Into<SettingValue>) {
        self.data.write().global.insert(key.to_string(), value.into());
    }

    /// Set a per-database value
    pub fn set_for_database(&self, database: &str, key: &str, value: impl Into<SettingValue>) {
        self.data
            .write()
            .databases
            .entry(database.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Remove every setting scoped to one database
    pub fn clear_database(&self, database: &str) {
        self.data.write().databases.remove(database);
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.data.read())?)
    }

    /// Replace contents from a JSON document
    pub fn load_json(&self, json: &str) -> Result<()> {
        let parsed: SettingsData = serde_json::from_str(json)?;
        *self.data.write() = parsed;
        Ok(())
    }

    /// Save to a file, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!(path = ?path, "settings saved");
        Ok(())
    }

    /// Load from a file; a missing file leaves the store empty
    pub fn load_from(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            tracing::debug!(path = ?path, "no settings file, using defaults");
            return Ok(());
        }
        let content = std::fs::read_to_string(path)?;
        self.load_json(&content)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        SettingValue::Int(i)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
