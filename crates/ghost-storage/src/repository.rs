//! Repository implementations for SQLite-backed persistence.
//!
//! Provides AuditRepository and CommandRepository that operate on the
//! Database struct using raw SQL. Both are append-only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use ghost_core::error::GhostError;
use ghost_core::types::{AuditEntry, AuditOutcome, CommandRecord};

use crate::db::Database;

/// Repository for permission gate audit entries.
pub struct AuditRepository {
    db: Arc<Database>,
}

impl AuditRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append an entry. Returns the new row id.
    pub fn append(&self, entry: &AuditEntry) -> Result<i64, GhostError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO action_audit (timestamp, module, function, args, tier, outcome, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    entry.timestamp.to_rfc3339(),
                    entry.module,
                    entry.function,
                    entry.args,
                    entry.tier,
                    entry.outcome.to_string(),
                    entry.note,
                ],
            )
            .map_err(|e| GhostError::Storage(format!("Failed to append audit entry: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Return up to `limit` entries, newest first.
    pub fn query(&self, limit: u64) -> Result<Vec<AuditEntry>, GhostError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT timestamp, module, function, args, tier, outcome, note
                     FROM action_audit
                     ORDER BY id DESC
                     LIMIT ?1",
                )
                .map_err(|e| GhostError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit], |row| Ok(row_to_audit_entry(row)))
                .map_err(|e| GhostError::Storage(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                let entry = row.map_err(|e| GhostError::Storage(e.to_string()))??;
                entries.push(entry);
            }
            Ok(entries)
        })
    }
}

fn row_to_audit_entry(row: &rusqlite::Row<'_>) -> Result<AuditEntry, GhostError> {
    let timestamp: String = row.get(0).map_err(|e| GhostError::Storage(e.to_string()))?;
    let outcome: String = row.get(5).map_err(|e| GhostError::Storage(e.to_string()))?;
    let args: Option<String> = row.get(3).map_err(|e| GhostError::Storage(e.to_string()))?;

    Ok(AuditEntry {
        timestamp: parse_timestamp(&timestamp)?,
        module: row.get(1).map_err(|e| GhostError::Storage(e.to_string()))?,
        function: row.get(2).map_err(|e| GhostError::Storage(e.to_string()))?,
        args: args.unwrap_or_default(),
        tier: row.get(4).map_err(|e| GhostError::Storage(e.to_string()))?,
        outcome: outcome.parse::<AuditOutcome>().map_err(GhostError::InvalidValue)?,
        note: row.get(6).map_err(|e| GhostError::Storage(e.to_string()))?,
    })
}

/// Repository for the per-command history log.
pub struct CommandRepository {
    db: Arc<Database>,
}

impl CommandRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a command record. Returns the new row id.
    pub fn append(&self, record: &CommandRecord) -> Result<i64, GhostError> {
        let actions = serde_json::to_string(&record.actions)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO commands (run_id, timestamp, user_input, ai_thought, actions_taken, result, success)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    record.run_id.to_string(),
                    record.timestamp.to_rfc3339(),
                    record.input,
                    record.thought,
                    actions,
                    record.digest,
                    record.success as i32,
                ],
            )
            .map_err(|e| GhostError::Storage(format!("Failed to log command: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Return the last `n` commands in chronological order (oldest first).
    pub fn recent(&self, n: u64) -> Result<Vec<CommandRecord>, GhostError> {
        let mut records = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT run_id, timestamp, user_input, ai_thought, actions_taken, result, success
                     FROM commands
                     ORDER BY id DESC
                     LIMIT ?1",
                )
                .map_err(|e| GhostError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![n], |row| Ok(row_to_command_record(row)))
                .map_err(|e| GhostError::Storage(e.to_string()))?;

            let mut records = Vec::new();
            for row in rows {
                let record = row.map_err(|e| GhostError::Storage(e.to_string()))??;
                records.push(record);
            }
            Ok(records)
        })?;
        records.reverse();
        Ok(records)
    }
}

fn row_to_command_record(row: &rusqlite::Row<'_>) -> Result<CommandRecord, GhostError> {
    let run_id: String = row.get(0).map_err(|e| GhostError::Storage(e.to_string()))?;
    let timestamp: String = row.get(1).map_err(|e| GhostError::Storage(e.to_string()))?;
    let actions: String = row.get(4).map_err(|e| GhostError::Storage(e.to_string()))?;
    let success: i32 = row.get(6).map_err(|e| GhostError::Storage(e.to_string()))?;

    Ok(CommandRecord {
        run_id: Uuid::parse_str(&run_id).map_err(|e| GhostError::Storage(e.to_string()))?,
        timestamp: parse_timestamp(&timestamp)?,
        input: row.get(2).map_err(|e| GhostError::Storage(e.to_string()))?,
        thought: row.get(3).map_err(|e| GhostError::Storage(e.to_string()))?,
        actions: serde_json::from_str(&actions)?,
        digest: row.get(5).map_err(|e| GhostError::Storage(e.to_string()))?,
        success: success != 0,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, GhostError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GhostError::Storage(format!("Invalid timestamp '{}': {}", raw, e)))
}
