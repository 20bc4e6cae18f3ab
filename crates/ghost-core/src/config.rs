use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GhostError, Result};

/// Top-level configuration for the Ghost agent.
///
/// Loaded from `~/.ghost/config.toml` by default. Environment variables are
/// applied on top of the file through [`GhostConfig::apply_env_overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GhostConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl GhostConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GhostConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GhostError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply `GHOST_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `GHOST_SECURITY_PIN`, `GHOST_SECURITY_LOG_ENABLED`,
    /// `GHOST_DATA_DIR`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pin) = lookup("GHOST_SECURITY_PIN") {
            self.security.pin = pin;
        }
        if let Some(raw) = lookup("GHOST_SECURITY_LOG_ENABLED") {
            self.security.audit_enabled = match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(GhostError::Config(format!(
                        "GHOST_SECURITY_LOG_ENABLED must be true or false, got '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(dir) = lookup("GHOST_DATA_DIR") {
            self.general.data_dir = dir;
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.ghost/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Permission gate and PIN session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// PIN secret for CRITICAL actions. Empty disables the match requirement.
    pub pin: String,
    /// Record every permission decision in the audit log.
    pub audit_enabled: bool,
    /// Lifetime of an unlocked PIN session, in seconds.
    pub pin_session_ttl_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            pin: String::new(),
            audit_enabled: true,
            pin_session_ttl_secs: 300,
        }
    }
}

/// Execution loop and delivery limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Outbound text longer than this is split into several messages.
    pub max_message_chars: usize,
    /// Cap for a text field pulled out of a structured result in the digest.
    pub summary_item_chars: usize,
    /// Cap for a bare scalar result in the digest.
    pub summary_scalar_chars: usize,
    /// Cap for the serialized arguments stored with an audit entry.
    pub audit_args_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4000,
            summary_item_chars: 1000,
            summary_scalar_chars: 500,
            audit_args_chars: 800,
        }
    }
}
