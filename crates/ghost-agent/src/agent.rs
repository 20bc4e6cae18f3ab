//! Front door for user commands: plan, confirm, authorize, execute.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use ghost_core::types::CommandRecord;

use crate::confirmation::plan_needs_confirmation;
use crate::error::PinRequired;
use crate::executor::PlanExecutor;
use crate::planner::Planner;
use crate::security::PermissionGate;
use crate::types::{ActionPlan, PlanReport};

/// What happened to a user command.
#[derive(Debug)]
pub enum HandleOutcome {
    /// The plan ran; the report holds every step.
    Finished(PlanReport),
    /// The plan contains destructive actions and was not run. Pass it to
    /// [`Agent::execute_confirmed`] once the user agrees.
    NeedsConfirmation(ActionPlan),
    /// A CRITICAL action had no PIN session. Nothing was dispatched.
    NeedsPin { plan: ActionPlan, blocked: PinRequired },
    /// The planner failed; the error was reported and persisted.
    PlanningFailed(String),
}

pub struct Agent {
    planner: Arc<dyn Planner>,
    gate: Arc<PermissionGate>,
    executor: PlanExecutor,
}

impl Agent {
    pub fn new(planner: Arc<dyn Planner>, gate: Arc<PermissionGate>, executor: PlanExecutor) -> Self {
        Self {
            planner,
            gate,
            executor,
        }
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    /// Plan `input` and run it unless it needs confirmation or a PIN.
    pub async fn handle(&self, input: &str) -> HandleOutcome {
        let plan = match self.planner.plan(input).await {
            Ok(plan) => plan,
            Err(e) => return self.planning_failed(input, e.to_string()).await,
        };

        if plan_needs_confirmation(&plan) {
            info!(actions = plan.actions.len(), "Plan needs user confirmation");
            return HandleOutcome::NeedsConfirmation(plan);
        }
        self.execute_confirmed(input, plan).await
    }

    /// Run a plan the user has confirmed. CRITICAL actions still need an
    /// open PIN session.
    pub async fn execute_confirmed(&self, input: &str, plan: ActionPlan) -> HandleOutcome {
        if let Err(blocked) = self.gate.authorize_plan(&plan) {
            info!(step = blocked.step, module = %blocked.module, function = %blocked.function, "Plan blocked pending PIN");
            self.notify(&format!("{}. Enter your PIN to continue.", blocked)).await;
            return HandleOutcome::NeedsPin { plan, blocked };
        }
        HandleOutcome::Finished(self.executor.execute(input, &plan).await)
    }

    pub fn verify_pin(&self, entered: &str) -> bool {
        self.gate.sessions().verify_pin(entered)
    }

    pub fn lock_pin(&self) {
        self.gate.sessions().lock()
    }

    pub fn is_pin_unlocked(&self) -> bool {
        self.gate.sessions().is_unlocked()
    }

    async fn planning_failed(&self, input: &str, error: String) -> HandleOutcome {
        warn!(error = %error, "Planning failed");
        self.notify(&format!("Planning failed: {}", error)).await;

        let record = CommandRecord {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input: input.to_string(),
            thought: String::new(),
            actions: json!([]),
            digest: error.clone(),
            success: false,
        };
        if let Err(e) = self.executor.commands().append(&record) {
            warn!(error = %e, "Failed to persist command record");
        }
        HandleOutcome::PlanningFailed(error)
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.executor.outbound().send_text(text).await {
            warn!(error = %e, "Outbound message failed");
        }
    }
}
