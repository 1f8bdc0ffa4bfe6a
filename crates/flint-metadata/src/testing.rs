//! In-memory server fixture for tests
//!
//! `FakeServer` plays both the driver and the canned result store.
//! Responses are registered against SQL substrings (the first matching
//! pattern wins); parameterized detail queries can vary by their first
//! parameter. Unregistered queries return no rows, which reads as an
//! empty collection or a vanished object.

use crate::database::Database;
use async_trait::async_trait;
use flint_core::{
    ConnectionProfile, Credentials, FlintError, MetadataSession, NullProgress, ProgressIndicator,
    Result, Row, ServerDriver, ServerInfo, Settings, Value,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Canned {
    Rows(Vec<Row>),
    ByParam(HashMap<String, Vec<Row>>),
    Fail(String),
}

#[derive(Default)]
struct FakeData {
    responses: Vec<(String, Canned)>,
    info: ServerInfo,
}

/// One fake session; all sessions share their server's canned data
pub struct FakeSession {
    data: Arc<RwLock<FakeData>>,
    query_log: Mutex<Vec<String>>,
    begins: AtomicUsize,
    commits: AtomicUsize,
    info_calls: AtomicUsize,
    closed: AtomicBool,
}

impl FakeSession {
    /// Every SQL text this session has executed, in order
    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }

    pub fn query_count(&self) -> usize {
        self.query_log.lock().len()
    }

    pub fn begin_count(&self) -> usize {
        self.begins.load(Ordering::Relaxed)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn info_call_count(&self) -> usize {
        self.info_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MetadataSession for FakeSession {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.query_log.lock().push(sql.to_string());
        let data = self.data.read();
        // most recent registration wins, so tests can re-script queries
        for (pattern, canned) in data.responses.iter().rev() {
            if sql.contains(pattern.as_str()) {
                return match canned {
                    Canned::Rows(rows) => Ok(rows.clone()),
                    Canned::ByParam(by_param) => {
                        let key = params
                            .first()
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        Ok(by_param.get(&key).cloned().unwrap_or_default())
                    }
                    Canned::Fail(message) => Err(FlintError::Query(message.clone())),
                };
            }
        }
        Ok(Vec::new())
    }

    async fn begin(&self) -> Result<()> {
        self.begins.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        self.info_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.data.read().info.clone())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Fake driver plus shared canned data
pub struct FakeServer {
    data: Arc<RwLock<FakeData>>,
    connect_delay: RwLock<Duration>,
    fail_connect: AtomicBool,
    sessions: Mutex<Vec<Arc<FakeSession>>>,
}

impl FakeServer {
    /// A server at the given ODS version with sensible defaults
    pub fn with_ods(major: u32, minor: u32) -> Arc<FakeServer> {
        let info = ServerInfo {
            ods_major: major,
            ods_minor: minor,
            page_size: 8192,
            pages: 100,
            dialect: 3,
            ..ServerInfo::default()
        };
        Arc::new(FakeServer {
            data: Arc::new(RwLock::new(FakeData {
                responses: Vec::new(),
                info,
            })),
            connect_delay: RwLock::new(Duration::ZERO),
            fail_connect: AtomicBool::new(false),
            sessions: Mutex::new(Vec::new()),
        })
    }

    pub fn new() -> Arc<FakeServer> {
        Self::with_ods(11, 2)
    }

    /// Register rows for every query containing `pattern`
    pub fn on(&self, pattern: &str, rows: Vec<Row>) {
        self.data
            .write()
            .responses
            .push((pattern.to_string(), Canned::Rows(rows)));
    }

    /// Register rows for queries containing `pattern`, keyed by the
    /// first query parameter
    pub fn on_param(&self, pattern: &str, key: &str, rows: Vec<Row>) {
        let mut data = self.data.write();
        for (existing, canned) in data.responses.iter_mut() {
            if existing.as_str() == pattern
                && let Canned::ByParam(by_param) = canned
            {
                by_param.insert(key.to_string(), rows);
                return;
            }
        }
        let mut by_param = HashMap::new();
        by_param.insert(key.to_string(), rows);
        data.responses
            .push((pattern.to_string(), Canned::ByParam(by_param)));
    }

    /// Make every query containing `pattern` fail
    pub fn fail_query(&self, pattern: &str, message: &str) {
        self.data
            .write()
            .responses
            .push((pattern.to_string(), Canned::Fail(message.to_string())));
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.write() = delay;
    }

    /// Change the reported ODS version (visible to future info fetches)
    pub fn set_ods(&self, major: u32, minor: u32) {
        let mut data = self.data.write();
        data.info.ods_major = major;
        data.info.ods_minor = minor;
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Every session this server has handed out
    pub fn sessions(&self) -> Vec<Arc<FakeSession>> {
        self.sessions.lock().clone()
    }

    pub fn last_session(&self) -> Option<Arc<FakeSession>> {
        self.sessions.lock().last().cloned()
    }
}

#[async_trait]
impl ServerDriver for FakeServer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn connect(
        &self,
        _profile: &ConnectionProfile,
        _credentials: &Credentials,
    ) -> Result<Arc<dyn MetadataSession>> {
        let delay = *self.connect_delay.read();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(FlintError::Connection("handshake refused".to_string()));
        }
        let session = Arc::new(FakeSession {
            data: self.data.clone(),
            query_log: Mutex::new(Vec::new()),
            begins: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        });
        self.sessions.lock().push(session.clone());
        Ok(session)
    }
}

/// Single-column identifier rows, as the seed queries return them
pub fn name_rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .map(|name| Row::new(vec![Value::from(*name)]))
        .collect()
}

/// A database wired to the fake server, not yet connected
pub fn unconnected_database(server: &Arc<FakeServer>) -> Arc<Database> {
    let driver: Arc<dyn ServerDriver> = server.clone();
    Database::new(
        ConnectionProfile::new("testdb", "localhost", "/data/testdb.fdb"),
        driver,
        Arc::new(Settings::new()),
    )
}

/// A database connected to the fake server
pub async fn connected_database(server: &Arc<FakeServer>) -> Arc<Database> {
    let db = unconnected_database(server);
    db.connect(Some("masterkey"), &NullProgress)
        .await
        .expect("fake connect");
    db
}

/// Connect with a caller-supplied progress indicator
pub async fn connect_with_progress(
    server: &Arc<FakeServer>,
    progress: &dyn ProgressIndicator,
) -> (Arc<Database>, Result<()>) {
    let db = unconnected_database(server);
    let result = db.connect(Some("masterkey"), progress).await;
    (db, result)
}
