//! The built-in device action catalog and its simulated executor.
//!
//! The engine treats the executor as an opaque capability; this one is a
//! dry-run implementation that reports what it *would* do, so a learning
//! session can be driven safely on any machine. The catalog flags follow
//! the reward scheme: information-gathering actions are `complex`
//! (high-value on success), everyday toggles are `critical` (failures are
//! penalized harder).

use heimakt_core::{
    ActionCatalog, ActionSpec, CatalogError, ExecutionOutcome, Executor,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Catalog of device operations the demo agent can choose from.
pub fn default_catalog() -> Result<ActionCatalog, CatalogError> {
    ActionCatalog::new(vec![
        ActionSpec::new("take_screenshot").complex(),
        ActionSpec::new("show_system_info").complex(),
        ActionSpec::new("check_network_status").complex(),
        ActionSpec::new("open_file_browser").critical(),
        ActionSpec::new("open_notepad").critical(),
        ActionSpec::new("mute_audio").critical(),
        ActionSpec::new("unmute_audio"),
        ActionSpec::new("volume_up"),
        ActionSpec::new("volume_down"),
        ActionSpec::new("open_browser"),
        ActionSpec::new("open_calculator"),
        ActionSpec::new("open_calendar"),
        ActionSpec::new("open_terminal"),
        ActionSpec::new("lock_screen"),
        ActionSpec::new("minimize_all_windows"),
        ActionSpec::new("close_active_window"),
        ActionSpec::new("open_task_manager"),
    ])
}

/// Dry-run executor: never touches the host, always reports metadata.
#[derive(Debug, Default)]
pub struct SimulatedExecutor;

impl Executor for SimulatedExecutor {
    fn execute(&mut self, action: &str, params: &BTreeMap<String, Value>) -> ExecutionOutcome {
        let Some(kind) = classify(action) else {
            return ExecutionOutcome::failure(format!("unknown action: {action}"));
        };

        let message = match action {
            "take_screenshot" => "Screenshot captured (simulated)".to_string(),
            "show_system_info" => format!(
                "System: {} on {} (simulated)",
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            "check_network_status" => "Network reachable (simulated)".to_string(),
            other => format!("Executed {} (simulated)", other.replace('_', " ")),
        };

        let mut outcome = ExecutionOutcome::success(message)
            .with_metadata("simulated", Value::Bool(true))
            .with_metadata("action_type", Value::String(kind.to_string()));
        if !params.is_empty() {
            outcome = outcome.with_metadata(
                "parameters",
                Value::Array(params.keys().map(|k| Value::String(k.clone())).collect()),
            );
        }
        outcome
    }
}

fn classify(action: &str) -> Option<&'static str> {
    let kind = match action {
        "take_screenshot" => "capture",
        "show_system_info" | "check_network_status" => "diagnostics",
        "mute_audio" | "unmute_audio" | "volume_up" | "volume_down" => "audio",
        "open_file_browser" | "open_notepad" | "open_browser" | "open_calculator"
        | "open_calendar" | "open_terminal" | "open_task_manager" => "application",
        "lock_screen" | "minimize_all_windows" | "close_active_window" => "window",
        _ => return None,
    };
    Some(kind)
}
