//! Ghost application binary - composition root.
//!
//! 1. Load configuration from TOML, then apply environment overrides
//! 2. Initialize tracing
//! 3. Open SQLite storage for the audit trail and command history
//! 4. Build the capability registry, permission gate and plan executor
//! 5. Run the requested subcommand

mod cli;
mod console;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghost_agent::{
    Agent, CapabilityRegistry, HandleOutcome, PermissionGate, PlanExecutor, PlanStatus, Planner,
};
use ghost_core::config::GhostConfig;
use ghost_storage::{AuditRepository, CommandRepository, Database};

use cli::{CliArgs, Command};
use console::{ConsoleChannel, StaticPlanner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = GhostConfig::load_or_default(&config_file);
    config.apply_env_overrides()?;

    // Tracing. Logs go to stderr so stdout carries only outbound messages.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Ghost v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("ghost.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let audit = Arc::new(AuditRepository::new(Arc::clone(&db)));
    let commands = Arc::new(CommandRepository::new(Arc::clone(&db)));

    match args.command {
        Command::Exec {
            plan,
            input,
            pin,
            yes,
        } => {
            let raw = std::fs::read_to_string(&plan)?;
            let planner: Arc<dyn Planner> = Arc::new(StaticPlanner::new(raw));

            let mut registry = CapabilityRegistry::new();
            registry.register_defaults();
            tracing::info!(capabilities = registry.len(), "Capability registry ready");

            let gate = Arc::new(PermissionGate::from_config(
                &config.security,
                &config.agent,
                audit,
            ));
            let executor = PlanExecutor::new(
                Arc::new(registry),
                Arc::clone(&planner),
                Arc::new(ConsoleChannel),
                commands,
                &config.agent,
            );
            let agent = Agent::new(planner, gate, executor);

            if let Some(pin) = pin {
                if !agent.verify_pin(&pin) {
                    eprintln!("Incorrect PIN.");
                    std::process::exit(2);
                }
            }

            let outcome = match agent.handle(&input).await {
                HandleOutcome::NeedsConfirmation(plan) if yes => {
                    agent.execute_confirmed(&input, plan).await
                }
                other => other,
            };
            report(outcome);
        }
        Command::Audit { limit } => {
            for entry in audit.query(limit as u64)? {
                println!(
                    "{}  {:<9}  {:<19}  {}.{}  {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.tier,
                    entry.outcome,
                    entry.module,
                    entry.function,
                    entry.note
                );
            }
        }
        Command::History { limit } => {
            for record in commands.recent(limit as u64)? {
                println!(
                    "{}  [{}]  {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    if record.success { "ok" } else { "failed" },
                    record.input
                );
                if !record.digest.is_empty() {
                    println!("    {}", record.digest.replace('\n', "\n    "));
                }
            }
        }
    }

    Ok(())
}

fn report(outcome: HandleOutcome) {
    match outcome {
        HandleOutcome::Finished(report) => {
            let status = match report.status {
                PlanStatus::Completed => "completed".to_string(),
                PlanStatus::Aborted { at_step } => format!("stopped after action {}", at_step + 1),
            };
            tracing::info!(run_id = %report.run_id, success = report.success, "Plan {}", status);
            if !report.success {
                std::process::exit(1);
            }
        }
        HandleOutcome::NeedsConfirmation(plan) => {
            eprintln!(
                "This plan needs confirmation:\n{}\nRe-run with --yes to proceed.",
                ghost_agent::confirmation::describe_pending(&plan)
            );
            std::process::exit(3);
        }
        HandleOutcome::NeedsPin { .. } => {
            eprintln!("Re-run with --pin <PIN> to open a PIN session.");
            std::process::exit(2);
        }
        HandleOutcome::PlanningFailed(error) => {
            eprintln!("Planning failed: {}", error);
            std::process::exit(1);
        }
    }
}
