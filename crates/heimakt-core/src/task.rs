//! Task intake, execution outcome and the immutable task record.

use crate::state::StateKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One task as submitted by a caller: free text plus an optional context
/// mapping that only enriches the state key and is never interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, Value>>,
}

/// What an [`Executor`](crate::Executor) reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub message: String,
    /// Opaque to the engine; forwarded into the task record as-is.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Audit breakdown of every reward component applied for one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Execution-time reward derived from the outcome alone.
    pub internal: f32,
    /// Delta from affirmative/negative human feedback, 0 without feedback.
    pub feedback: f32,
    /// Extra penalty on the chosen pair when a correction was supplied.
    pub correction_penalty: f32,
    /// Boost applied to the user-suggested alternative action.
    pub correction_boost: f32,
}

impl RewardBreakdown {
    /// Sum over all components, for reporting.
    pub fn total(&self) -> f32 {
        self.internal + self.feedback + self.correction_penalty + self.correction_boost
    }
}

/// Ordered confidence category derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceCategory {
    Low,
    #[serde(rename = "Low-Medium")]
    LowMedium,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl fmt::Display for ConfidenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::LowMedium => "Low-Medium",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium-High",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

/// The three weighted inputs to the confidence score, recorded so the
/// score can be re-derived from the task record later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceComponents {
    pub relative_standing: f32,
    pub experience: f32,
    pub spread: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    /// Blended confidence, always in [0, 1].
    pub score: f32,
    pub category: ConfidenceCategory,
    pub components: ConfidenceComponents,
}

/// A next-best alternative to the chosen action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: String,
    pub q_value: f32,
}

/// Immutable record of one full decision cycle.
///
/// Created when a task is processed, finalized when feedback is applied or
/// the task is closed without it; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub description: String,
    pub intent: String,
    pub state: StateKey,
    /// Action the engine chose (explore or exploit).
    pub action: String,
    /// Value estimates seen at selection time, one entry per catalog action.
    pub q_values: BTreeMap<String, f32>,
    pub confidence: ConfidenceReport,
    /// Top alternatives by value estimate, excluding the chosen action.
    pub next_best: Vec<Suggestion>,
    pub outcome: ExecutionOutcome,
    pub reward: RewardBreakdown,
    /// Normalized feedback token ("positive"/"negative"), if any arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// ISO-8601 creation timestamp.
    pub ts: String,
}
