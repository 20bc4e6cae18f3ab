//! Command log: one persisted record per executed plan.

use std::sync::Mutex;

use ghost_core::error::GhostError;
use ghost_core::types::CommandRecord;
use ghost_storage::CommandRepository;

/// Where the execution loop persists its command records.
pub trait CommandLog: Send + Sync {
    fn append(&self, record: &CommandRecord) -> Result<(), GhostError>;
}

impl CommandLog for CommandRepository {
    fn append(&self, record: &CommandRecord) -> Result<(), GhostError> {
        CommandRepository::append(self, record).map(|_| ())
    }
}

/// In-process command log.
#[derive(Default)]
pub struct MemoryCommandLog {
    records: Mutex<Vec<CommandRecord>>,
}

impl MemoryCommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far, oldest first.
    pub fn records(&self) -> Vec<CommandRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl CommandLog for MemoryCommandLog {
    fn append(&self, record: &CommandRecord) -> Result<(), GhostError> {
        self.records
            .lock()
            .map_err(|e| GhostError::Storage(format!("command log lock poisoned: {}", e)))?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ghost_storage::Database;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn record(input: &str) -> CommandRecord {
        CommandRecord {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input: input.to_string(),
            thought: "t".to_string(),
            actions: json!([]),
            digest: String::new(),
            success: true,
        }
    }

    #[test]
    fn test_memory_log_keeps_order() {
        let log = MemoryCommandLog::new();
        log.append(&record("first")).unwrap();
        log.append(&record("second")).unwrap();
        let inputs: Vec<_> = log.records().into_iter().map(|r| r.input).collect();
        assert_eq!(inputs, vec!["first", "second"]);
    }

    #[test]
    fn test_repository_as_command_log() {
        let repo = CommandRepository::new(Arc::new(Database::in_memory().unwrap()));
        let log: &dyn CommandLog = &repo;
        log.append(&record("take a screenshot")).unwrap();
        let stored = repo.recent(5).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].input, "take a screenshot");
    }
}
