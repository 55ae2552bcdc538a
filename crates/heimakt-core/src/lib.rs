//! Core traits and types shared by the heimakt workspace.
//!
//! This crate carries no I/O and no learning logic: it defines the action
//! catalog, the state key, the task record, and the traits the decision
//! engine uses to talk to its collaborators (executor, intent parser).

pub mod action;
pub mod state;
pub mod task;

pub use action::{ActionCatalog, ActionId, ActionSpec, CatalogError};
pub use state::StateKey;
pub use task::{
    ConfidenceCategory, ConfidenceComponents, ConfidenceReport, ExecutionOutcome,
    RewardBreakdown, Suggestion, TaskRecord, TaskRequest,
};

use serde_json::Value;
use std::collections::BTreeMap;

/// Executes a named action against the outside world.
///
/// The engine never inspects *how* an action executes; it only consumes the
/// returned outcome. A failed execution is a valid outcome, not an error.
pub trait Executor {
    fn execute(&mut self, action: &str, params: &BTreeMap<String, Value>) -> ExecutionOutcome;
}

/// Maps a free-text task description to a canonical intent label.
///
/// `None` means the description is unprocessable; the engine rejects the
/// task without mutating any learned state.
pub trait IntentParser {
    fn parse(&self, description: &str) -> Option<String>;
}
