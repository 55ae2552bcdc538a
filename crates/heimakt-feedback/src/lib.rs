#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Reward composition and human feedback interpretation.
//!
//! This crate turns execution outcomes and free-form feedback tokens into
//! scalar reward signals with a full audit breakdown. It follows the
//! principle: **heimakt-feedback composes and classifies, it never touches
//! the policy table itself** — the decision engine applies the resulting
//! deltas through the policy store's update operation.

pub mod session;

pub use session::{EpisodeSummary, SessionTracker};

use heimakt_core::{ActionCatalog, ActionSpec, RewardBreakdown};
use serde::{Deserialize, Serialize};

// Internal reward constants, applied at execution time only.
/// Reward for a successful execution
pub const REWARD_SUCCESS: f32 = 1.0;
/// Reward when a high-value ("complex") action succeeds
pub const REWARD_SUCCESS_COMPLEX: f32 = 1.5;
/// Reward for a failed execution
pub const REWARD_FAILURE: f32 = -1.0;
/// Reward when a basic ("critical") action fails
pub const REWARD_FAILURE_CRITICAL: f32 = -1.5;

// Feedback reward constants.
/// Delta for affirmative feedback
pub const FEEDBACK_POSITIVE: f32 = 0.5;
/// Delta for negative feedback
pub const FEEDBACK_NEGATIVE: f32 = -0.5;

// Correction constants, active only when negative feedback names a valid
// alternative action.
/// Additional penalty on the originally chosen pair
pub const CORRECTION_PENALTY: f32 = -0.5;
/// Boost applied to the suggested alternative pair
pub const CORRECTION_BOOST: f32 = 1.0;

/// Interpreted human feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSignal {
    Positive,
    Negative,
}

impl FeedbackSignal {
    /// Normalize a raw token from the small fixed vocabulary.
    ///
    /// Unrecognized tokens yield `None` — "no feedback", never an error.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "👍" | "positive" | "good" | "yes" | "y" => Some(Self::Positive),
            "👎" | "negative" | "bad" | "no" | "n" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn reward(self) -> f32 {
        match self {
            Self::Positive => FEEDBACK_POSITIVE,
            Self::Negative => FEEDBACK_NEGATIVE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Execution-time reward for an action's outcome, honoring its catalog flags.
#[must_use]
pub fn internal_reward(spec: &ActionSpec, success: bool) -> f32 {
    if success {
        if spec.complex {
            REWARD_SUCCESS_COMPLEX
        } else {
            REWARD_SUCCESS
        }
    } else if spec.critical {
        REWARD_FAILURE_CRITICAL
    } else {
        REWARD_FAILURE
    }
}

/// Validate a suggested alternative against the catalog.
///
/// Suggestions only take effect alongside negative feedback; unknown
/// suggestions are dropped silently while the rest of the feedback still
/// applies.
#[must_use]
pub fn accepted_suggestion<'a>(
    signal: Option<FeedbackSignal>,
    suggestion: Option<&'a str>,
    catalog: &ActionCatalog,
) -> Option<&'a str> {
    match signal {
        Some(FeedbackSignal::Negative) => suggestion.filter(|s| catalog.contains(s)),
        _ => None,
    }
}

/// Compose the full reward breakdown for one task.
///
/// `suggestion_accepted` is the caller's catalog-validated correction flag
/// (see [`accepted_suggestion`]). The breakdown is pure bookkeeping; the
/// engine decides which components become policy-store updates.
#[must_use]
pub fn compose(
    spec: &ActionSpec,
    success: bool,
    signal: Option<FeedbackSignal>,
    suggestion_accepted: bool,
) -> RewardBreakdown {
    let feedback = signal.map(FeedbackSignal::reward).unwrap_or(0.0);
    let correction = signal == Some(FeedbackSignal::Negative) && suggestion_accepted;

    RewardBreakdown {
        internal: internal_reward(spec, success),
        feedback,
        correction_penalty: if correction { CORRECTION_PENALTY } else { 0.0 },
        correction_boost: if correction { CORRECTION_BOOST } else { 0.0 },
    }
}
