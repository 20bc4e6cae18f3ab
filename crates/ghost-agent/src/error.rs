//! Error types for the agent.

use ghost_core::error::GhostError;

/// Errors from agent plumbing: planner, outbound channel, registry setup.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Planner failed: {0}")]
    Planner(String),
    #[error("Outbound delivery failed: {0}")]
    Outbound(String),
    #[error("Module name is reserved for the outbound channel: {0}")]
    ReservedModule(String),
    #[error("Storage error: {0}")]
    Storage(#[from] GhostError),
}

/// Errors raised by a capability invocation.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("{0}")]
    Failed(String),
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("Capability worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for CapabilityError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            CapabilityError::Worker("capability panicked".to_string())
        } else {
            CapabilityError::Worker(err.to_string())
        }
    }
}

impl From<std::io::Error> for CapabilityError {
    fn from(err: std::io::Error) -> Self {
        CapabilityError::Failed(err.to_string())
    }
}

/// A (module, function) pair with no registered capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{module}.{function} not available")]
pub struct NotRegistered {
    pub module: String,
    pub function: String,
}

/// A CRITICAL action was refused because no PIN session is active.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("PIN required for {module}.{function} (action {})", .step + 1)]
pub struct PinRequired {
    /// Zero-based index of the blocked action within its plan.
    pub step: usize,
    pub module: String,
    pub function: String,
}
