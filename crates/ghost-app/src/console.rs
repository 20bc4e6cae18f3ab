//! Terminal adapters for the agent's external collaborators.

use std::path::Path;

use async_trait::async_trait;
use ghost_agent::{parse_plan, Action, ActionPlan, AgentError, OutboundChannel, Planner};

/// Prints outbound messages to stdout.
pub struct ConsoleChannel;

#[async_trait]
impl OutboundChannel for ConsoleChannel {
    async fn send_text(&self, text: &str) -> Result<(), AgentError> {
        println!("{}", text);
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), AgentError> {
        if caption.is_empty() {
            println!("[file] {}", path.display());
        } else {
            println!("[file] {} ({})", path.display(), caption);
        }
        Ok(())
    }
}

/// Serves one pre-written plan, parsed like live planner output.
///
/// Has no model behind it, so recovery suggestions always fall back.
pub struct StaticPlanner {
    raw: String,
}

impl StaticPlanner {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

#[async_trait]
impl Planner for StaticPlanner {
    async fn plan(&self, _input: &str) -> Result<ActionPlan, AgentError> {
        Ok(parse_plan(&self.raw))
    }

    async fn suggest_recovery(&self, _action: &Action, _error: &str) -> Result<String, AgentError> {
        Err(AgentError::Planner("no recovery model configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_agent::Args;

    #[tokio::test]
    async fn test_static_planner_parses_fenced_plan() {
        let planner = StaticPlanner::new(
            "```json\n{\"thought\": \"t\", \"actions\": [{\"module\": \"file_system\", \"function\": \"list_files\"}]}\n```",
        );
        let plan = planner.plan("ignored").await.unwrap();
        assert_eq!(plan.thought, "t");
        assert_eq!(plan.actions[0].qualified_name(), "file_system.list_files");
    }

    #[tokio::test]
    async fn test_static_planner_has_no_recovery() {
        let planner = StaticPlanner::new("{}");
        let action = Action::new("email", "send_email", Args::new());
        assert!(planner.suggest_recovery(&action, "boom").await.is_err());
    }
}
