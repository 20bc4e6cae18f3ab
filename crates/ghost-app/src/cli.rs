//! CLI argument definitions for the Ghost binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ghost: run action plans against local capabilities.
#[derive(Parser, Debug)]
#[command(name = "ghost", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a plan read from a JSON file.
    Exec {
        /// Plan file; raw planner output, code fences allowed.
        #[arg(long = "plan")]
        plan: PathBuf,

        /// The user command the plan answers, stored in history.
        #[arg(long = "input", default_value = "")]
        input: String,

        /// Open a PIN session before running.
        #[arg(long = "pin")]
        pin: Option<String>,

        /// Treat destructive actions as already confirmed.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Show recent permission decisions, newest first.
    Audit {
        #[arg(long = "limit", default_value_t = 20)]
        limit: usize,
    },
    /// Show recent command records, oldest first.
    History {
        #[arg(long = "limit", default_value_t = 20)]
        limit: usize,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > GHOST_CONFIG env var > ~/.ghost/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("GHOST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --data-dir flag > config value (after env overrides).
    pub fn resolve_data_dir(&self, config_data_dir: &str) -> PathBuf {
        match self.data_dir {
            Some(ref p) => p.clone(),
            None => expand_home(config_data_dir),
        }
    }

    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var(var).ok().map(PathBuf::from)
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from(".")).join(rest),
        None => PathBuf::from(path),
    }
}

fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".ghost").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
