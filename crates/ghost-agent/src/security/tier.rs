//! Permission tiers and the static (module, function) -> tier table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::is_outbound_module;

/// Permission classification of an action, ordered from least to most risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionTier {
    /// Read-only queries.
    Safe = 0,
    /// Writes, sends, automation.
    Moderate = 1,
    /// Destructive or irreversible; confirmed by the user upstream.
    Dangerous = 2,
    /// Requires an active PIN session.
    Critical = 3,
}

impl PermissionTier {
    pub fn name(self) -> &'static str {
        match self {
            PermissionTier::Safe => "SAFE",
            PermissionTier::Moderate => "MODERATE",
            PermissionTier::Dangerous => "DANGEROUS",
            PermissionTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for PermissionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tier for a `(module, function)` pair. Pairs not listed are MODERATE.
pub fn tier_for(module: &str, function: &str) -> PermissionTier {
    use PermissionTier::*;

    if is_outbound_module(module) {
        return Safe;
    }

    match (module, function) {
        (
            "pc_control",
            "screenshot" | "get_open_apps" | "get_system_stats" | "get_system_info"
            | "get_disk_info" | "get_network_info" | "ping" | "get_battery_info"
            | "get_clipboard" | "list_windows" | "list_services" | "get_processes"
            | "get_env_var" | "check_for_updates",
        ) => Safe,
        (
            "pc_control",
            "kill_process" | "run_command" | "sleep_pc" | "hibernate_pc" | "empty_recycle_bin"
            | "manage_service",
        ) => Dangerous,
        ("pc_control", "restart_pc" | "shutdown_pc") => Critical,

        ("file_system", "find_file" | "list_files" | "read_file" | "send_file_to_telegram") => Safe,
        ("file_system", "delete_file") => Dangerous,

        ("email", "get_emails") => Safe,
        ("whatsapp", "get_messages" | "get_unread") => Safe,

        ("document", "read_excel" | "read_pdf" | "read_google_sheet") => Safe,

        ("browser", "get_page_text" | "search_web" | "scrape_page") => Safe,

        (
            "google_services",
            "list_drive_files" | "search_drive" | "list_calendar_events" | "get_calendar_event"
            | "read_google_doc" | "get_gmail_messages" | "get_gmail_full_body"
            | "list_google_contacts",
        ) => Safe,
        ("google_services", "delete_drive_file" | "delete_calendar_event") => Dangerous,

        ("memory", "get_notes" | "search_memory") => Safe,

        ("scheduler", "list_schedules") => Safe,
        ("scheduler", "delete_schedule") => Dangerous,

        ("workflow", "list_workflows_text") => Safe,
        ("workflow", "delete_workflow_by_id") => Dangerous,

        ("screen_watcher", "query_screen_history" | "watcher_status") => Safe,

        (
            "personality",
            "get_personality_status" | "get_ghost_replies" | "get_ghost_sessions"
            | "build_contact_profile" | "draft_reply" | "refine_reply",
        ) => Safe,

        ("voice", "transcribe_voice") => Safe,
        ("media", "get_current_playing") => Safe,

        (
            "config_manager",
            "get_config_status" | "get_setup_guide" | "suggest_setup" | "get_env_path_info",
        ) => Safe,

        _ => Moderate,
    }
}
