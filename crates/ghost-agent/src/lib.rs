//! Action-plan execution engine for Ghost.
//!
//! Takes a plan produced by an external planner, resolves inter-step result
//! references, gates actions by permission tier, dispatches them through a
//! capability registry and reports the results on an outbound channel.

pub mod agent;
pub mod capability;
pub mod confirmation;
pub mod error;
pub mod executor;
pub mod history;
pub mod outbound;
pub mod placeholder;
pub mod planner;
pub mod security;
pub mod summary;
pub mod types;

pub use agent::{Agent, HandleOutcome};
pub use capability::{BlockingCapability, Capability, CapabilityRegistry};
pub use confirmation::plan_needs_confirmation;
pub use error::{AgentError, CapabilityError, NotRegistered, PinRequired};
pub use executor::PlanExecutor;
pub use history::{CommandLog, MemoryCommandLog};
pub use outbound::OutboundChannel;
pub use planner::{parse_plan, Planner};
pub use security::{AuditSink, Decision, MemoryAuditLog, PermissionGate, SecuritySessionStore};
pub use summary::Summarizer;
pub use types::{
    Action, ActionOutcome, ActionPlan, ActionResult, Args, PlanReport, PlanStatus, StepRecord,
};
