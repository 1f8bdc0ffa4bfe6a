//! Triggers: DML, database-level and DDL
//!
//! All three trigger classes share one payload; the class is encoded in
//! the server's trigger type code. Codes 8192..=8196 are database
//! triggers (connect/disconnect/transaction events), codes above 8196
//! are DDL triggers, everything else is a DML trigger whose BEFORE/AFTER
//! half lives in bit 0 and whose INSERT/UPDATE/DELETE event list is
//! packed in 2-bit groups.

use crate::identifier::Identifier;
use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use flint_core::{Row, ServerInfo, Value};

/// When a trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringTime {
    DatabaseConnect,
    DatabaseDisconnect,
    TransactionStart,
    TransactionCommit,
    TransactionRollback,
    BeforeIud,
    AfterIud,
    Invalid,
}

/// Decode the server's trigger type code
pub fn firing_time(trigger_type: i64) -> FiringTime {
    match trigger_type {
        8192 => FiringTime::DatabaseConnect,
        8193 => FiringTime::DatabaseDisconnect,
        8194 => FiringTime::TransactionStart,
        8195 => FiringTime::TransactionCommit,
        8196 => FiringTime::TransactionRollback,
        t if t % 2 == 1 => FiringTime::BeforeIud,
        t if t != 0 => FiringTime::AfterIud,
        _ => FiringTime::Invalid,
    }
}

/// Scalar properties of one trigger
#[derive(Debug, Default)]
pub struct TriggerProps {
    /// Owning relation; empty for database and DDL triggers
    pub relation_name: Option<Identifier>,
    pub position: i32,
    pub active: bool,
    pub trigger_type: i64,
    pub source: String,
    pub entry_point: Option<String>,
    pub engine_name: Option<String>,
    pub sql_security: Option<String>,
}

impl TriggerProps {
    pub fn firing_time(&self) -> FiringTime {
        firing_time(self.trigger_type)
    }

    pub fn is_database_trigger(&self) -> bool {
        matches!(
            self.firing_time(),
            FiringTime::DatabaseConnect | FiringTime::DatabaseDisconnect
        )
    }

    /// Render the firing clause, e.g. "BEFORE INSERT OR UPDATE" or
    /// "ON CONNECT"
    pub fn firing_event(&self) -> String {
        let mut out = String::new();
        match self.firing_time() {
            FiringTime::DatabaseConnect => out.push_str("ON CONNECT"),
            FiringTime::DatabaseDisconnect => out.push_str("ON DISCONNECT"),
            FiringTime::TransactionStart => out.push_str("ON TRANSACTION START"),
            FiringTime::TransactionCommit => out.push_str("ON TRANSACTION COMMIT"),
            FiringTime::TransactionRollback => out.push_str("ON TRANSACTION ROLLBACK"),
            FiringTime::BeforeIud | FiringTime::AfterIud => {
                if self.firing_time() == FiringTime::BeforeIud {
                    out.push_str("BEFORE ");
                } else {
                    out.push_str("AFTER ");
                }
                // universal trigger encoding: three 2-bit groups after
                // dropping bit 0
                const EVENTS: [&str; 3] = ["INSERT", "UPDATE", "DELETE"];
                let mut t = (self.trigger_type + 1) >> 1;
                let mut first = true;
                for _ in 0..3 {
                    let code = (t % 4) as usize;
                    if code != 0 {
                        if !first {
                            out.push_str(" OR ");
                        }
                        out.push_str(EVENTS[code - 1]);
                        first = false;
                    }
                    t >>= 2;
                }
            }
            FiringTime::Invalid => {}
        }
        out
    }
}

pub(crate) fn properties_query(
    item: &MetadataItem,
    info: &ServerInfo,
) -> Option<(String, Vec<Value>)> {
    let mut sql = String::from(
        "select t.rdb$relation_name, t.rdb$trigger_sequence, \
         t.rdb$trigger_inactive, t.rdb$trigger_type, rdb$trigger_source, ",
    );
    sql += if info.ods_at_least(12, 0) {
        " rdb$entrypoint, rdb$engine_name, "
    } else {
        " null, null, "
    };
    sql += if info.ods_at_least(13, 0) {
        " rdb$sql_security "
    } else {
        " null "
    };
    sql += "from rdb$triggers t where rdb$trigger_name = ? ";
    Some((sql, vec![Value::from(item.name().get())]))
}

pub(crate) fn apply_row(props: &mut TriggerProps, row: &Row) -> Option<i64> {
    props.relation_name = row.trimmed_text(0).map(Identifier::new);
    props.position = row.int(1).unwrap_or(-1);
    props.active = row.int(2).unwrap_or(0) == 0;
    props.trigger_type = row.int64(3).unwrap_or(0);
    props.sql_security = row
        .bool(7)
        .map(|b| crate::relation::sql_security_text(b).to_string());

    props.source = String::new();
    props.entry_point = row.trimmed_text(5);
    props.engine_name = row.trimmed_text(6);
    if let Some(entry) = &props.entry_point {
        props.source += &format!("EXTERNAL NAME '{}'\n", entry);
        if let Some(engine) = &props.engine_name {
            props.source += &format!("ENGINE {}\n", engine);
        }
    }
    if let Some(body) = row.text(4) {
        props.source += "\n";
        props.source += body.trim_start();
        props.source += "\n";
    }
    None
}

/// Relation name of a loaded DML trigger; `None` for database triggers
pub fn relation_name(item: &MetadataItem) -> Option<Identifier> {
    item.with_properties(|props| match props {
        Properties::Trigger(p) if !p.is_database_trigger() => {
            p.relation_name.clone().filter(|n| !n.is_empty())
        }
        _ => None,
    })
}

pub(crate) fn seed_query(kind: ObjectKind, _info: &ServerInfo) -> String {
    match kind {
        ObjectKind::DmlTriggers => {
            "select rdb$trigger_name from rdb$triggers \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$trigger_type between 1 and 6 \
             order by 1"
        }
        ObjectKind::DbTriggers => {
            "select rdb$trigger_name from rdb$triggers \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$trigger_type between 8192 and 8196 \
             order by 1"
        }
        ObjectKind::DdlTriggers => {
            "select rdb$trigger_name from rdb$triggers \
             where (rdb$system_flag = 0 or rdb$system_flag is null) \
             and rdb$trigger_type > 8196 \
             order by 1"
        }
        _ => unreachable!("not a trigger collection"),
    }
    .to_string()
}

/// ALTER (or CREATE OR ALTER) statement reproducing the trigger
pub fn alter_sql(item: &MetadataItem) -> String {
    item.with_properties(|props| {
        let Properties::Trigger(p) = props else {
            return String::new();
        };
        let mut sql = String::from("SET TERM ^ ;\n");
        if p.relation_name.as_ref().is_none_or(|n| n.is_empty()) {
            sql += "CREATE OR ";
        }
        sql += &format!("ALTER TRIGGER {} ", item.quoted_name());
        sql += if p.active { "ACTIVE" } else { "INACTIVE" };
        sql += &format!("\n{} POSITION {}\n", p.firing_event(), p.position);
        if let Some(security) = &p.sql_security {
            sql += security;
            sql += "\n";
        }
        sql += &p.source;
        sql += "^\nSET TERM ; ^\n";
        sql
    })
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
