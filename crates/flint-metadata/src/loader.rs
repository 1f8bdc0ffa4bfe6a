//! Shared access to the metadata session
//!
//! Wraps the session with nested transaction counting: the outermost
//! `attach_transaction` begins a real transaction, inner attachments
//! just bump the count, and the matching outermost detach commits. A
//! multi-collection load batch attaches once at the top so every query
//! inside sees one transactional snapshot.

use flint_core::{FlintError, MetadataSession, Result, Row, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Session handle plus transaction nesting state
pub struct MetadataLoader {
    session: Arc<dyn MetadataSession>,
    transaction_level: Mutex<u32>,
}

impl MetadataLoader {
    pub fn new(session: Arc<dyn MetadataSession>) -> Self {
        Self {
            session,
            transaction_level: Mutex::new(0),
        }
    }

    pub fn session(&self) -> &Arc<dyn MetadataSession> {
        &self.session
    }

    /// Enter a metadata transaction; only the outermost call begins one
    pub async fn attach_transaction(&self) -> Result<()> {
        let begin = {
            let mut level = self.transaction_level.lock();
            *level += 1;
            *level == 1
        };
        if begin {
            self.session.begin().await?;
        }
        Ok(())
    }

    /// Leave a metadata transaction; the outermost call commits
    pub async fn detach_transaction(&self) -> Result<()> {
        let commit = {
            let mut level = self.transaction_level.lock();
            if *level == 0 {
                return Err(FlintError::Other(
                    "transaction detach without attach".to_string(),
                ));
            }
            *level -= 1;
            *level == 0
        };
        if commit {
            self.session.commit().await?;
        }
        Ok(())
    }

    /// Current transaction nesting depth
    pub fn transaction_level(&self) -> u32 {
        *self.transaction_level.lock()
    }

    /// Run a query and fetch all rows
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.session.query(sql, params).await
    }

    /// Run a query expected to return at most one row
    pub async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }
}

impl std::fmt::Debug for MetadataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataLoader")
            .field("transaction_level", &self.transaction_level())
            .finish()
    }
}
