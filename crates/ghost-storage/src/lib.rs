//! Ghost storage crate - SQLite persistence for the audit trail and the
//! command history.
//!
//! Provides a WAL-mode SQLite database with migrations and append-only
//! repositories for permission decisions and handled commands.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{AuditRepository, CommandRepository};
