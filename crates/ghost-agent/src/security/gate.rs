//! Permission gate: tier lookup, decision table and audit trail.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use ghost_core::config::{AgentConfig, SecurityConfig};
use ghost_core::types::{AuditEntry, AuditOutcome};

use super::audit::AuditSink;
use super::session::SecuritySessionStore;
use super::tier::{tier_for, PermissionTier};
use crate::error::PinRequired;
use crate::types::{is_outbound_module, truncate_chars, ActionPlan, Args};

/// Result of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    NeedsPin,
}

/// Classifies actions and decides whether they may run.
///
/// Holds no state of its own besides the shared PIN session; the only I/O is
/// the audit write.
pub struct PermissionGate {
    sessions: Arc<SecuritySessionStore>,
    audit: Arc<dyn AuditSink>,
    audit_enabled: bool,
    audit_args_chars: usize,
}

impl PermissionGate {
    pub fn new(
        sessions: Arc<SecuritySessionStore>,
        audit: Arc<dyn AuditSink>,
        audit_enabled: bool,
        audit_args_chars: usize,
    ) -> Self {
        Self {
            sessions,
            audit,
            audit_enabled,
            audit_args_chars,
        }
    }

    /// Build a gate and its session store from configuration.
    pub fn from_config(security: &SecurityConfig, agent: &AgentConfig, audit: Arc<dyn AuditSink>) -> Self {
        let sessions = Arc::new(SecuritySessionStore::new(
            security.pin.clone(),
            security.pin_session_ttl_secs,
        ));
        Self::new(sessions, audit, security.audit_enabled, agent.audit_args_chars)
    }

    pub fn sessions(&self) -> &Arc<SecuritySessionStore> {
        &self.sessions
    }

    /// Decide whether `module.function` may run, recording the decision.
    pub fn check(&self, module: &str, function: &str, args: &Args) -> Decision {
        let tier = tier_for(module, function);
        let (decision, outcome, note) = match tier {
            PermissionTier::Safe | PermissionTier::Moderate => {
                (Decision::Allowed, AuditOutcome::Allowed, "")
            }
            PermissionTier::Dangerous => (
                Decision::Allowed,
                AuditOutcome::AllowedDangerous,
                "confirmed by user before dispatch",
            ),
            PermissionTier::Critical if self.sessions.is_unlocked() => (
                Decision::Allowed,
                AuditOutcome::AllowedPinSession,
                "PIN session active",
            ),
            PermissionTier::Critical => (
                Decision::NeedsPin,
                AuditOutcome::BlockedNeedsPin,
                "no active PIN session",
            ),
        };

        if tier >= PermissionTier::Dangerous {
            info!(module, function, tier = %tier, outcome = %outcome, "Permission check");
        }

        if self.audit_enabled {
            self.record(module, function, args, tier, outcome, note);
        }
        decision
    }

    /// Check every dispatchable action of a plan before it runs.
    ///
    /// Stops at the first action that needs a PIN; later actions are not
    /// checked and so not audited.
    pub fn authorize_plan(&self, plan: &ActionPlan) -> Result<(), PinRequired> {
        for (step, action) in plan.actions.iter().enumerate() {
            if is_outbound_module(&action.module) {
                continue;
            }
            if self.check(&action.module, &action.function, &action.args) == Decision::NeedsPin {
                return Err(PinRequired {
                    step,
                    module: action.module.clone(),
                    function: action.function.clone(),
                });
            }
        }
        Ok(())
    }

    fn record(
        &self,
        module: &str,
        function: &str,
        args: &Args,
        tier: PermissionTier,
        outcome: AuditOutcome,
        note: &str,
    ) {
        let serialized = serde_json::to_string(args).unwrap_or_default();
        let entry = AuditEntry {
            timestamp: Utc::now(),
            module: module.to_string(),
            function: function.to_string(),
            args: truncate_chars(&serialized, self.audit_args_chars),
            tier: tier.name().to_string(),
            outcome,
            note: note.to_string(),
        };
        if let Err(e) = self.audit.append(&entry) {
            warn!(error = %e, module, function, "Audit log write failed");
        }
    }
}
