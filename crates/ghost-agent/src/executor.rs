//! Plan execution loop.
//!
//! Drives one plan from its first action to its last, strictly in order:
//! resolve placeholders, run the outbound built-ins or dispatch through the
//! registry, interpret the result, then emit the digest and one command
//! record. Nothing here is fatal; every failure becomes a failed step and a
//! message to the user.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ghost_core::config::AgentConfig;
use ghost_core::types::CommandRecord;

use crate::capability::{Capability, CapabilityRegistry};
use crate::error::CapabilityError;
use crate::history::CommandLog;
use crate::outbound::{send_long, OutboundChannel};
use crate::placeholder::{resolve_args, text_projection};
use crate::planner::{actions_json, recovery_hint, Planner};
use crate::summary::Summarizer;
use crate::types::{
    is_outbound_module, Action, ActionOutcome, ActionPlan, ActionResult, Args, PlanReport,
    PlanStatus, StepRecord,
};

/// Runs plans against a capability registry.
///
/// Permission checks are the caller's job (see
/// [`PermissionGate::authorize_plan`](crate::security::PermissionGate::authorize_plan));
/// the executor dispatches whatever it is given.
pub struct PlanExecutor {
    registry: Arc<CapabilityRegistry>,
    planner: Arc<dyn Planner>,
    outbound: Arc<dyn OutboundChannel>,
    commands: Arc<dyn CommandLog>,
    summarizer: Summarizer,
    max_message_chars: usize,
}

impl PlanExecutor {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        planner: Arc<dyn Planner>,
        outbound: Arc<dyn OutboundChannel>,
        commands: Arc<dyn CommandLog>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            registry,
            planner,
            outbound,
            commands,
            summarizer: Summarizer::from_config(config),
            max_message_chars: config.max_message_chars,
        }
    }

    pub fn outbound(&self) -> &Arc<dyn OutboundChannel> {
        &self.outbound
    }

    pub fn commands(&self) -> &Arc<dyn CommandLog> {
        &self.commands
    }

    /// Execute every action of `plan` and persist the outcome.
    pub async fn execute(&self, input: &str, plan: &ActionPlan) -> PlanReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, actions = plan.actions.len(), "Executing plan");

        if !plan.thought.trim().is_empty() {
            self.notify(&plan.thought).await;
        }

        let mut results: Vec<ActionResult> = Vec::with_capacity(plan.actions.len());
        let mut steps: Vec<StepRecord> = Vec::with_capacity(plan.actions.len());
        let mut success = true;
        let mut status = PlanStatus::Completed;

        for (step, action) in plan.actions.iter().enumerate() {
            let args = resolve_args(&action.args, &results);
            debug!(%run_id, step, module = %action.module, function = %action.function, "Dispatching action");

            if is_outbound_module(&action.module) {
                let result = self.run_outbound(&action.function, &args).await;
                results.push(result.clone());
                steps.push(StepRecord {
                    module: action.module.clone(),
                    function: action.function.clone(),
                    result,
                    delivered: true,
                });
                continue;
            }

            let outcome = match self.registry.lookup(&action.module, &action.function) {
                Ok(capability) => invoke(capability, args).await,
                Err(miss) => {
                    warn!(%run_id, step, module = %action.module, function = %action.function, "Capability not registered");
                    ActionOutcome::failure(miss.to_string())
                }
            };

            let halts = outcome.halts();
            let failed = outcome.is_failure();
            let result = outcome.into_result();

            let delivered = if failed {
                success = false;
                self.report_failure(step, action, &result).await;
                true
            } else if let Some(path) = result.file_path() {
                let caption = result
                    .caption()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Result from {}", action.qualified_name()));
                self.deliver_file(Path::new(path), &caption).await;
                true
            } else {
                false
            };

            results.push(result.clone());
            steps.push(StepRecord {
                module: action.module.clone(),
                function: action.function.clone(),
                result,
                delivered,
            });

            if halts {
                if step + 1 < plan.actions.len() {
                    status = PlanStatus::Aborted { at_step: step };
                }
                info!(%run_id, step, remaining = plan.actions.len() - step - 1, "Stop-chain result, halting plan");
                break;
            }
        }

        let digest = self.summarizer.digest(&steps);
        if !digest.is_empty() {
            if let Err(e) = send_long(self.outbound.as_ref(), &digest, self.max_message_chars).await {
                warn!(%run_id, error = %e, "Failed to deliver digest");
            }
        }

        let record = CommandRecord {
            run_id,
            timestamp: Utc::now(),
            input: input.to_string(),
            thought: plan.thought.clone(),
            actions: actions_json(plan),
            digest: digest.clone(),
            success,
        };
        if let Err(e) = self.commands.append(&record) {
            warn!(%run_id, error = %e, "Failed to persist command record");
        }

        info!(%run_id, ?status, success, steps = steps.len(), "Plan finished");
        PlanReport {
            run_id,
            status,
            steps,
            digest,
            success,
        }
    }

    /// Built-in `send`/`send_message` and `send_file` of the outbound module.
    async fn run_outbound(&self, function: &str, args: &Args) -> ActionResult {
        match function {
            "send" | "send_message" => {
                let text = args.get("text").map(text_projection).unwrap_or_default();
                if let Err(e) = send_long(self.outbound.as_ref(), &text, self.max_message_chars).await {
                    warn!(error = %e, "Outbound send failed");
                }
                ActionResult::new(Value::String(text))
            }
            "send_file" => {
                let path = args.get("file_path").and_then(Value::as_str).unwrap_or("");
                let caption = args.get("caption").and_then(Value::as_str).unwrap_or("");
                if !path.is_empty() && Path::new(path).exists() {
                    self.deliver_file(Path::new(path), caption).await;
                    ActionResult::new(json!({ "success": true, "sent": path }))
                } else {
                    let error = format!("File not found: {}", path);
                    self.notify(&error).await;
                    ActionResult::failure(error)
                }
            }
            other => {
                warn!(function = other, "Unknown outbound function");
                ActionResult::new(Value::Null)
            }
        }
    }

    async fn report_failure(&self, step: usize, action: &Action, result: &ActionResult) {
        let error = result.error().unwrap_or("Unknown error");
        let hint = recovery_hint(self.planner.as_ref(), action, error).await;
        self.notify(&format!(
            "Action {} ({}) failed: {}\n\nSuggestion: {}",
            step + 1,
            action.qualified_name(),
            error,
            hint
        ))
        .await;
    }

    async fn deliver_file(&self, path: &Path, caption: &str) {
        if let Err(e) = self.outbound.send_file(path, caption).await {
            warn!(path = %path.display(), error = %e, "File delivery failed");
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = send_long(self.outbound.as_ref(), text, self.max_message_chars).await {
            warn!(error = %e, "Outbound message failed");
        }
    }
}

/// Invoke on a separate task so a panicking capability becomes a failed step.
async fn invoke(capability: Arc<dyn Capability>, args: Args) -> ActionOutcome {
    let handle = tokio::spawn(async move { capability.invoke(args).await });
    match handle.await.map_err(CapabilityError::from) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) | Err(e) => {
            warn!(error = %e, "Capability raised an error");
            ActionOutcome::failure(e.to_string())
        }
    }
}
