//! Planner contract and parsing of raw planner output into an [`ActionPlan`].

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::AgentError;
use crate::types::{truncate_chars, Action, ActionPlan, Args, OUTBOUND_MODULE};

/// Text used when the planner cannot produce a recovery suggestion.
pub const FALLBACK_RECOVERY: &str = "Unable to get recovery suggestion.";

/// Produces plans from user commands and advice for failed steps.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, input: &str) -> Result<ActionPlan, AgentError>;

    /// A short natural-language hint for recovering from a failed action.
    async fn suggest_recovery(&self, action: &Action, error: &str) -> Result<String, AgentError>;
}

/// Parse raw planner output.
///
/// Markdown code fences are stripped first. Anything that does not parse as a
/// plan becomes a one-action plan relaying the text on the outbound channel,
/// so this never fails.
pub fn parse_plan(raw: &str) -> ActionPlan {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<ActionPlan>(body) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, raw = %truncate_chars(body, 200), "Planner returned a non-plan response");
            relay_plan(body)
        }
    }
}

/// The degenerate plan that sends `text` back to the user verbatim.
///
/// The thought stays empty so the text is delivered once, by the send action.
pub fn relay_plan(text: &str) -> ActionPlan {
    let mut args = Args::new();
    args.insert("text".to_string(), Value::String(text.to_string()));
    ActionPlan {
        thought: String::new(),
        actions: vec![Action::new(OUTBOUND_MODULE, "send", args)],
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Drop the opening fence line, including any language tag.
    let inner = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Best-effort recovery hint: any planner error degrades to [`FALLBACK_RECOVERY`].
pub(crate) async fn recovery_hint(planner: &dyn Planner, action: &Action, error: &str) -> String {
    match planner.suggest_recovery(action, error).await {
        Ok(hint) if !hint.trim().is_empty() => hint.trim().to_string(),
        Ok(_) => FALLBACK_RECOVERY.to_string(),
        Err(e) => {
            warn!(error = %e, action = %action.qualified_name(), "Recovery suggestion failed");
            FALLBACK_RECOVERY.to_string()
        }
    }
}

/// The plan's actions as a JSON array, for persistence.
pub(crate) fn actions_json(plan: &ActionPlan) -> Value {
    serde_json::to_value(&plan.actions).unwrap_or_else(|_| json!([]))
}
