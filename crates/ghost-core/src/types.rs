//! Value types shared between the agent and the storage layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Audit
// =============================================================================

/// Result of a single permission gate check, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// SAFE or MODERATE action, allowed.
    Allowed,
    /// DANGEROUS action, allowed after upstream confirmation.
    AllowedDangerous,
    /// CRITICAL action, allowed by an active PIN session.
    AllowedPinSession,
    /// CRITICAL action without an active PIN session.
    BlockedNeedsPin,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Allowed => write!(f, "allowed"),
            AuditOutcome::AllowedDangerous => write!(f, "allowed_dangerous"),
            AuditOutcome::AllowedPinSession => write!(f, "allowed_pin_session"),
            AuditOutcome::BlockedNeedsPin => write!(f, "blocked_needs_pin"),
        }
    }
}

impl std::str::FromStr for AuditOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowed" => Ok(AuditOutcome::Allowed),
            "allowed_dangerous" => Ok(AuditOutcome::AllowedDangerous),
            "allowed_pin_session" => Ok(AuditOutcome::AllowedPinSession),
            "blocked_needs_pin" => Ok(AuditOutcome::BlockedNeedsPin),
            _ => Err(format!("Unknown audit outcome: {}", s)),
        }
    }
}

/// One immutable record of a permission gate decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub module: String,
    pub function: String,
    /// JSON rendering of the action arguments, truncated to a fixed size.
    pub args: String,
    /// Tier name, e.g. `CRITICAL`.
    pub tier: String,
    pub outcome: AuditOutcome,
    pub note: String,
}

// =============================================================================
// Command log
// =============================================================================

/// Persisted summary of one handled user command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub thought: String,
    /// The plan's actions exactly as received from the planner.
    pub actions: serde_json::Value,
    pub digest: String,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_outcome_display() {
        assert_eq!(AuditOutcome::Allowed.to_string(), "allowed");
        assert_eq!(AuditOutcome::AllowedDangerous.to_string(), "allowed_dangerous");
        assert_eq!(AuditOutcome::AllowedPinSession.to_string(), "allowed_pin_session");
        assert_eq!(AuditOutcome::BlockedNeedsPin.to_string(), "blocked_needs_pin");
    }

    #[test]
    fn test_audit_outcome_from_str() {
        for variant in [
            AuditOutcome::Allowed,
            AuditOutcome::AllowedDangerous,
            AuditOutcome::AllowedPinSession,
            AuditOutcome::BlockedNeedsPin,
        ] {
            assert_eq!(variant.to_string().parse::<AuditOutcome>().unwrap(), variant);
        }
        assert!("denied".parse::<AuditOutcome>().is_err());
    }

    #[test]
    fn test_audit_outcome_serde_matches_display() {
        let json = serde_json::to_string(&AuditOutcome::BlockedNeedsPin).unwrap();
        assert_eq!(json, "\"blocked_needs_pin\"");
    }
}
