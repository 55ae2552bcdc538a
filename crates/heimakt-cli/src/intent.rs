//! Keyword-based intent parsing for the interactive session.
//!
//! Resolution order: exact action name, then keyword patterns, then a
//! token-overlap fallback against the action names. Anything below the
//! overlap threshold is unprocessable (`None`) and the engine rejects the
//! task without touching the policy.

use heimakt_core::IntentParser;
use std::collections::BTreeSet;

/// Minimum Jaccard overlap between task words and an action's words for
/// the fallback match to count.
const FALLBACK_OVERLAP_THRESHOLD: f32 = 0.3;

/// Keyword patterns per intent. Order matters where one keyword is a
/// substring of another ("unmute" before "mute").
const PATTERNS: &[(&str, &[&str])] = &[
    ("unmute_audio", &["unmute", "sound on", "audio on", "enable sound"]),
    ("mute_audio", &["mute", "silence", "quiet", "disable sound"]),
    ("volume_up", &["volume up", "louder", "increase volume", "raise volume"]),
    ("volume_down", &["volume down", "quieter", "decrease volume", "lower volume"]),
    (
        "take_screenshot",
        &["screenshot", "capture screen", "screen shot", "snap screen", "record screen"],
    ),
    (
        "open_file_browser",
        &["file browser", "browse files", "file manager", "finder", "explorer"],
    ),
    (
        "open_notepad",
        &["notepad", "text editor", "edit text", "new document", "word processor", "code editor"],
    ),
    (
        "open_browser",
        &["browser", "internet", "web search", "search online", "music player"],
    ),
    ("open_calculator", &["calculator", "calc", "arithmetic", "spreadsheet"]),
    ("open_calendar", &["calendar", "schedule", "appointment", "meeting", "planner"]),
    ("open_terminal", &["terminal", "command prompt", "console", "shell", "bash"]),
    ("lock_screen", &["lock screen", "lock computer", "secure system", "privacy"]),
    ("minimize_all_windows", &["minimize all", "show desktop", "hide all"]),
    ("close_active_window", &["close window", "close app", "close current"]),
    (
        "open_task_manager",
        &["task manager", "activity monitor", "processes", "docker", "container"],
    ),
    (
        "show_system_info",
        &["system info", "specs", "hardware info", "system specs", "antivirus"],
    ),
    (
        "check_network_status",
        &["network", "connectivity", "internet connection", "network test"],
    ),
];

/// Maps free text to a canonical intent label from the action catalog.
#[derive(Debug)]
pub struct KeywordIntentParser {
    actions: Vec<String>,
}

impl KeywordIntentParser {
    pub fn new(actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntentParser for KeywordIntentParser {
    fn parse(&self, description: &str) -> Option<String> {
        let task = description.trim().to_lowercase();
        if task.is_empty() {
            return None;
        }

        // Direct action-name match, with or without underscores.
        let underscored = task.replace(' ', "_");
        if self.actions.iter().any(|a| *a == underscored) {
            return Some(underscored);
        }

        // Keyword patterns.
        for (intent, keywords) in PATTERNS {
            if keywords.iter().any(|kw| task.contains(kw)) {
                return Some((*intent).to_string());
            }
        }

        // Fallback: closest action by word overlap.
        let task_words: BTreeSet<&str> = task
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|w| !w.is_empty())
            .collect();

        let mut best: Option<(&str, f32)> = None;
        for action in &self.actions {
            let action_words: BTreeSet<&str> = action.split('_').collect();
            let intersection = task_words.intersection(&action_words).count();
            let union = task_words.union(&action_words).count();
            if union == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let score = intersection as f32 / union as f32;
            if score > FALLBACK_OVERLAP_THRESHOLD
                && best.map(|(_, b)| score > b).unwrap_or(true)
            {
                best = Some((action, score));
            }
        }
        best.map(|(action, _)| action.to_string())
    }
}
