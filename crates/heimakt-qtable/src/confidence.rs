//! Confidence scoring over a state's value estimates.
//!
//! The score is a bounded secondary signal describing how trustworthy the
//! chosen action looks given the current estimates. It never influences
//! action selection. Pure function of its inputs: given the same
//! (action, estimates) pair it reproduces the same report, which is what
//! makes the recorded components auditable after the fact.

use crate::ValueEstimate;
use heimakt_core::{ConfidenceCategory, ConfidenceComponents, ConfidenceReport};
use std::collections::BTreeMap;

// Blend weights. Relative standing dominates, experience is secondary,
// spread tertiary; they must sum to 1.0.
/// Weight of the softmax relative-standing component.
const WEIGHT_RELATIVE_STANDING: f32 = 0.6;
/// Weight of the usage-count experience component.
const WEIGHT_EXPERIENCE: f32 = 0.25;
/// Weight of the value-spread component.
const WEIGHT_SPREAD: f32 = 0.15;

/// Usage count at which the experience component saturates at 1.
const EXPERIENCE_SATURATION: f32 = 10.0;
/// Q-value spread that maps to a spread component of 1.
const SPREAD_NORMALIZER: f32 = 2.0;
/// Upper bound of the spread component.
const SPREAD_CEILING: f32 = 1.0;
/// Relative standing assigned when all estimates are equal, so a fresh
/// state never hits a degenerate divide.
const NEUTRAL_RELATIVE_STANDING: f32 = 0.5;

// Category thresholds on the blended score.
const THRESHOLD_HIGH: f32 = 0.8;
const THRESHOLD_MEDIUM_HIGH: f32 = 0.6;
const THRESHOLD_MEDIUM: f32 = 0.4;
const THRESHOLD_LOW_MEDIUM: f32 = 0.2;

/// Score the chosen `action` against the state's `estimates`.
///
/// `estimates` is expected to cover every catalog action (untried ones at
/// `q = 0`), as produced by [`QTable::estimates`](crate::QTable::estimates).
#[must_use]
pub fn score(action: &str, estimates: &BTreeMap<String, ValueEstimate>) -> ConfidenceReport {
    let components = ConfidenceComponents {
        relative_standing: relative_standing(action, estimates),
        experience: experience(action, estimates),
        spread: spread(estimates),
    };

    let blended = WEIGHT_RELATIVE_STANDING * components.relative_standing
        + WEIGHT_EXPERIENCE * components.experience
        + WEIGHT_SPREAD * components.spread;
    let score = blended.clamp(0.0, 1.0);

    ConfidenceReport {
        score,
        category: categorize(score),
        components,
    }
}

/// Map a numeric confidence to its ordered category.
#[must_use]
pub fn categorize(score: f32) -> ConfidenceCategory {
    if score >= THRESHOLD_HIGH {
        ConfidenceCategory::High
    } else if score >= THRESHOLD_MEDIUM_HIGH {
        ConfidenceCategory::MediumHigh
    } else if score >= THRESHOLD_MEDIUM {
        ConfidenceCategory::Medium
    } else if score >= THRESHOLD_LOW_MEDIUM {
        ConfidenceCategory::LowMedium
    } else {
        ConfidenceCategory::Low
    }
}

/// Softmax over the state's q-values, then the chosen action's weight
/// min-max normalized across actions into [0, 1].
fn relative_standing(action: &str, estimates: &BTreeMap<String, ValueEstimate>) -> f32 {
    if estimates.is_empty() {
        return NEUTRAL_RELATIVE_STANDING;
    }

    let max_q = estimates
        .values()
        .map(|e| e.q)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_q = estimates.values().map(|e| e.q).fold(f32::INFINITY, f32::min);
    if (max_q - min_q).abs() < f32::EPSILON {
        return NEUTRAL_RELATIVE_STANDING;
    }

    // Max-subtracted softmax keeps the exponentials in (0, 1].
    let weights: BTreeMap<&str, f32> = estimates
        .iter()
        .map(|(name, e)| (name.as_str(), (e.q - max_q).exp()))
        .collect();
    let sum: f32 = weights.values().sum();

    let prob_of = |name: &str| weights.get(name).copied().unwrap_or(0.0) / sum;
    let p_action = prob_of(action);
    let p_max = weights.values().copied().fold(f32::NEG_INFINITY, f32::max) / sum;
    let p_min = weights.values().copied().fold(f32::INFINITY, f32::min) / sum;

    if (p_max - p_min).abs() < f32::EPSILON {
        return NEUTRAL_RELATIVE_STANDING;
    }
    ((p_action - p_min) / (p_max - p_min)).clamp(0.0, 1.0)
}

/// Usage count of the chosen pair relative to the saturation threshold.
fn experience(action: &str, estimates: &BTreeMap<String, ValueEstimate>) -> f32 {
    let count = estimates.get(action).map(|e| e.count).unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let raw = count as f32 / EXPERIENCE_SATURATION;
    raw.min(1.0)
}

/// Dispersion of the state's q-values: a wide spread means the ranking is
/// informative, a flat table means it is not.
fn spread(estimates: &BTreeMap<String, ValueEstimate>) -> f32 {
    if estimates.len() < 2 {
        return 0.0;
    }
    let max_q = estimates
        .values()
        .map(|e| e.q)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_q = estimates.values().map(|e| e.q).fold(f32::INFINITY, f32::min);
    ((max_q - min_q) / SPREAD_NORMALIZER).min(SPREAD_CEILING)
}
