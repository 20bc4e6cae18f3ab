//! Detection of plans that must be confirmed by the user before running.
//!
//! This only decides *whether* to ask. Asking, and waiting for the answer, is
//! the front end's business; a confirmed plan comes back through
//! [`Agent::execute_confirmed`](crate::agent::Agent::execute_confirmed).

use serde_json::Value;

use crate::types::{Action, ActionPlan};

/// Function-name fragments that mark an action as destructive.
const DESTRUCTIVE_KEYWORDS: &[&str] = &["delete", "restart", "shutdown", "kill", "format"];

/// True if any action asks for confirmation or looks destructive.
pub fn plan_needs_confirmation(plan: &ActionPlan) -> bool {
    plan.actions.iter().any(action_needs_confirmation)
}

pub fn action_needs_confirmation(action: &Action) -> bool {
    if matches!(action.args.get("confirm"), Some(Value::Bool(true))) {
        return true;
    }
    let function = action.function.to_lowercase();
    DESTRUCTIVE_KEYWORDS.iter().any(|kw| function.contains(kw))
}

/// Human-readable list of the actions awaiting confirmation.
pub fn describe_pending(plan: &ActionPlan) -> String {
    plan.actions
        .iter()
        .filter(|a| action_needs_confirmation(a))
        .map(|a| format!("- {}", a.qualified_name()))
        .collect::<Vec<_>>()
        .join("\n")
}
