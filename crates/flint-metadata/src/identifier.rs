//! Object name normalization and quoting
//!
//! Names that arrive from the server are stored exactly as the server
//! returns them (minus CHAR padding). Names typed by a user in SQL form
//! are normalized the way the server would: unquoted names fold to
//! uppercase, delimited names keep their exact spelling. Lookups compare
//! the normalized text, case sensitively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// System object name prefixes
const SYSTEM_PREFIXES: [&str; 3] = ["RDB$", "SEC$", "MON$"];

/// A normalized database object name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    text: String,
}

impl Identifier {
    /// From server output or other already-normalized text; trailing
    /// CHAR padding is removed
    pub fn new(raw: impl Into<String>) -> Self {
        let mut text: String = raw.into();
        let trimmed = text.trim_end();
        if trimmed.len() != text.len() {
            text = trimmed.to_string();
        }
        Self { text }
    }

    /// From SQL source: `"Mixed Case"` keeps its spelling (embedded
    /// doubled quotes collapse), anything else folds to uppercase
    pub fn from_sql(sql_name: &str) -> Self {
        let s = sql_name.trim();
        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            let inner = &s[1..s.len() - 1];
            Self {
                text: inner.replace("\"\"", "\""),
            }
        } else {
            Self {
                text: s.to_uppercase(),
            }
        }
    }

    /// The normalized name
    pub fn get(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether rendering this name in SQL requires delimited syntax
    pub fn needs_quoting(&self) -> bool {
        let mut chars = self.text.chars();
        match chars.next() {
            None => false,
            Some(first) if !first.is_ascii_uppercase() => true,
            Some(_) => !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '$'),
        }
    }

    /// SQL rendering: quoted only when required, embedded quotes doubled
    pub fn quoted(&self) -> String {
        if self.needs_quoting() {
            format!("\"{}\"", self.text.replace('"', "\"\""))
        } else {
            self.text.clone()
        }
    }

    /// Exact comparison against a plain string
    pub fn equals(&self, other: &str) -> bool {
        self.text == other
    }

    /// Whether the name carries a system prefix (RDB$, SEC$, MON$)
    pub fn has_system_prefix(&self) -> bool {
        has_system_prefix(&self.text)
    }
}

/// Whether a raw name carries a system prefix
pub fn has_system_prefix(name: &str) -> bool {
    SYSTEM_PREFIXES.iter().any(|p| name.starts_with(p))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::new(s)
    }
}

#[cfg(test)]
#[path = "identifier_tests.rs"]
mod tests;
