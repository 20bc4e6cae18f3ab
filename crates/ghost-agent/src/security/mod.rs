//! Tiered permission policy for actions.
//!
//! Every `(module, function)` pair maps to a [`PermissionTier`]. CRITICAL
//! actions are only allowed while a PIN session is open; every decision is
//! written to an [`AuditSink`] when auditing is enabled.

pub mod audit;
pub mod gate;
pub mod session;
pub mod tier;

pub use audit::{AuditSink, MemoryAuditLog};
pub use gate::{Decision, PermissionGate};
pub use session::SecuritySessionStore;
pub use tier::{tier_for, PermissionTier};
