//! Append-only sinks for permission gate decisions.

use std::sync::Mutex;

use ghost_core::error::GhostError;
use ghost_core::types::AuditEntry;
use ghost_storage::AuditRepository;

/// Where the gate records its decisions.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AuditEntry) -> Result<(), GhostError>;

    /// Up to `limit` entries, newest first.
    fn query(&self, limit: usize) -> Result<Vec<AuditEntry>, GhostError>;
}

impl AuditSink for AuditRepository {
    fn append(&self, entry: &AuditEntry) -> Result<(), GhostError> {
        AuditRepository::append(self, entry).map(|_| ())
    }

    fn query(&self, limit: usize) -> Result<Vec<AuditEntry>, GhostError> {
        AuditRepository::query(self, limit as u64)
    }
}

/// In-process audit log, used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, entry: &AuditEntry) -> Result<(), GhostError> {
        self.entries
            .lock()
            .map_err(|e| GhostError::Storage(format!("audit lock poisoned: {}", e)))?
            .push(entry.clone());
        Ok(())
    }

    fn query(&self, limit: usize) -> Result<Vec<AuditEntry>, GhostError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| GhostError::Storage(format!("audit lock poisoned: {}", e)))?;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
