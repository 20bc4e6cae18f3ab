//! Database schema migrations.
//!
//! Creates the action_audit, commands and schema_migrations tables.

use rusqlite::Connection;
use tracing::info;

use ghost_core::error::GhostError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), GhostError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| GhostError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| GhostError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: audit trail and command log.
fn apply_v1(conn: &Connection) -> Result<(), GhostError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS action_audit (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp   TEXT NOT NULL,
            module      TEXT NOT NULL,
            function    TEXT NOT NULL,
            args        TEXT,
            tier        TEXT NOT NULL,
            outcome     TEXT NOT NULL
                        CHECK (outcome IN ('allowed', 'allowed_dangerous',
                                           'allowed_pin_session', 'blocked_needs_pin')),
            note        TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_action_audit_outcome
            ON action_audit (outcome, id DESC);

        CREATE TABLE IF NOT EXISTS commands (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id        TEXT NOT NULL,
            timestamp     TEXT NOT NULL,
            user_input    TEXT NOT NULL,
            ai_thought    TEXT NOT NULL DEFAULT '',
            actions_taken TEXT NOT NULL DEFAULT '[]',
            result        TEXT NOT NULL DEFAULT '',
            success       INTEGER NOT NULL DEFAULT 1
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| GhostError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}
