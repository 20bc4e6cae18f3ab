//! Plan and result types for the execution engine.
//!
//! An [`ActionPlan`] is produced once per user command by the planner and is
//! never modified afterwards. Each executed action yields one
//! [`ActionResult`], wrapped in an [`ActionOutcome`] that tells the loop
//! whether to keep going.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Keyword arguments passed to a capability.
pub type Args = Map<String, Value>;

/// Name of the reserved outbound-channel module.
pub const OUTBOUND_MODULE: &str = "outbound";

/// Legacy name some planners still emit for the outbound module.
pub const OUTBOUND_MODULE_ALIAS: &str = "telegram";

/// True for the module names the loop handles itself instead of dispatching.
pub fn is_outbound_module(module: &str) -> bool {
    module == OUTBOUND_MODULE || module == OUTBOUND_MODULE_ALIAS
}

// =============================================================================
// Plan
// =============================================================================

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub module: String,
    pub function: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Args,
}

impl Action {
    pub fn new(module: impl Into<String>, function: impl Into<String>, args: Args) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            args,
        }
    }

    /// `module.function`, as used in logs and user-facing messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }
}

/// Ordered list of actions plus the planner's rationale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Args, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Args>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Results
// =============================================================================

/// The value produced by one executed action.
///
/// Either a bare scalar or a mapping that may carry the recognized fields
/// `success`, `error`, `text`, `file_path`, `caption` and `stop_chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionResult(Value);

impl ActionResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// `{success: false, error: <message>}`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self(serde_json::json!({ "success": false, "error": error.into() }))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Only an explicit `success: false` counts as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self.0.get("success"), Some(Value::Bool(false)))
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn file_path(&self) -> Option<&str> {
        self.str_field("file_path")
    }

    pub fn caption(&self) -> Option<&str> {
        self.str_field("caption")
    }

    pub fn stop_chain(&self) -> bool {
        matches!(self.0.get("stop_chain"), Some(Value::Bool(true)))
    }

    /// Mark as failed, keeping the existing error text when present.
    fn into_failure(self) -> Self {
        match self.0 {
            Value::Object(mut map) => {
                map.insert("success".to_string(), Value::Bool(false));
                let has_error = map
                    .get("error")
                    .and_then(Value::as_str)
                    .is_some_and(|e| !e.is_empty());
                if !has_error {
                    map.insert("error".to_string(), Value::String("Unknown error".to_string()));
                }
                Self(Value::Object(map))
            }
            Value::String(s) if !s.trim().is_empty() => Self::failure(s),
            _ => Self::failure("Unknown error"),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Value> for ActionResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// What a capability invocation produced, and whether the plan continues.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Success(ActionResult),
    Failure(ActionResult),
    /// Post-process the result, then dispatch nothing further in this plan.
    StopChain(ActionResult),
}

impl ActionOutcome {
    pub fn success(value: Value) -> Self {
        ActionOutcome::Success(ActionResult::new(value))
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ActionOutcome::Failure(ActionResult::failure(error))
    }

    pub fn stop(value: Value) -> Self {
        ActionOutcome::StopChain(ActionResult::new(value))
    }

    pub fn result(&self) -> &ActionResult {
        match self {
            ActionOutcome::Success(r) | ActionOutcome::Failure(r) | ActionOutcome::StopChain(r) => r,
        }
    }

    /// The result to record for this step.
    ///
    /// A `Failure` whose value does not already read as a failure is marked
    /// with `success: false`, so later steps and the digest see it as one.
    pub fn into_result(self) -> ActionResult {
        match self {
            ActionOutcome::Failure(r) if !r.is_failure() => r.into_failure(),
            ActionOutcome::Success(r) | ActionOutcome::Failure(r) | ActionOutcome::StopChain(r) => r,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failure(_)) || self.result().is_failure()
    }

    /// True for the `StopChain` variant and for any result carrying
    /// `stop_chain: true`.
    pub fn halts(&self) -> bool {
        matches!(self, ActionOutcome::StopChain(_)) || self.result().stop_chain()
    }
}

impl From<Value> for ActionOutcome {
    /// Classify a raw result by its `stop_chain` and `success` fields.
    fn from(value: Value) -> Self {
        let result = ActionResult::new(value);
        if result.stop_chain() {
            ActionOutcome::StopChain(result)
        } else if result.is_failure() {
            ActionOutcome::Failure(result)
        } else {
            ActionOutcome::Success(result)
        }
    }
}

// =============================================================================
// Execution report
// =============================================================================

/// One executed step as the loop recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub module: String,
    pub function: String,
    pub result: ActionResult,
    /// Already surfaced to the user (sent text, delivered file, reported error).
    pub delivered: bool,
}

/// Terminal state of a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Every action was processed.
    Completed,
    /// A stop-chain result at `at_step` halted the remaining actions.
    Aborted { at_step: usize },
}

/// Everything the loop produced for one plan.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub status: PlanStatus,
    pub steps: Vec<StepRecord>,
    pub digest: String,
    pub success: bool,
}

/// Truncate to at most `max` characters without splitting a code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
