#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Tabular Q-learning policy store.
//!
//! The [`QTable`] owns the mapping from state to per-action value estimates
//! plus the global learning parameters, and is the only place estimates are
//! mutated. Action selection, reward composition and episode bookkeeping
//! live elsewhere; this crate answers two questions: *what do we currently
//! believe about a state* ([`QTable::estimates`]) and *how does one observed
//! reward change that belief* ([`QTable::update`]).

pub mod confidence;
pub mod error;
pub mod persist;

pub use error::{QTableError, Result};
pub use persist::{LoadSource, PolicyPaths};

use heimakt_core::{ActionCatalog, StateKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Global learning parameters, persisted alongside the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Step size of the temporal-difference update.
    pub learning_rate: f32,
    /// Discount on the next state's best estimate.
    pub discount_factor: f32,
    /// Current exploration probability.
    pub epsilon: f32,
    /// Multiplicative decay applied to epsilon when an episode step closes.
    pub epsilon_decay: f32,
    /// Lower bound epsilon never falls below.
    pub epsilon_min: f32,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.2,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
        }
    }
}

/// Learned value of one (state, action) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEstimate {
    /// Q-value, driven toward observed rewards. Always finite.
    pub q: f32,
    /// How often this pair has been updated. Never decreases.
    pub count: u64,
    /// ISO-8601 timestamp of the last update; empty for untried pairs.
    pub last_updated: String,
}

impl ValueEstimate {
    /// The estimate reported for a pair the table has never seen.
    pub fn untried() -> Self {
        Self {
            q: 0.0,
            count: 0,
            last_updated: String::new(),
        }
    }
}

/// The policy table: value estimates, state visit counts and the learning
/// parameters that govern updates and exploration.
///
/// One instance per agent; concurrent callers must serialize access under a
/// single lock, since `update` is a read-then-write on the estimate.
#[derive(Debug, Clone)]
pub struct QTable {
    params: LearningParams,
    table: BTreeMap<StateKey, BTreeMap<String, ValueEstimate>>,
    visits: BTreeMap<StateKey, u64>,
}

impl QTable {
    pub fn new(params: LearningParams) -> Self {
        Self {
            params,
            table: BTreeMap::new(),
            visits: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn epsilon(&self) -> f32 {
        self.params.epsilon
    }

    /// Number of states with at least one learned estimate.
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Number of learned (state, action) pairs.
    pub fn pair_count(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    /// How often a state has been encountered by an update.
    pub fn visits(&self, state: &StateKey) -> u64 {
        self.visits.get(state).copied().unwrap_or(0)
    }

    /// States by descending visit count, at most `n`.
    pub fn most_visited(&self, n: usize) -> Vec<(StateKey, u64)> {
        let mut entries: Vec<(StateKey, u64)> = self
            .visits
            .iter()
            .map(|(s, v)| (s.clone(), *v))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Learned estimates for a state, if any.
    pub fn known(&self, state: &StateKey) -> Option<&BTreeMap<String, ValueEstimate>> {
        self.table.get(state)
    }

    /// Estimates for every catalog action in `state`.
    ///
    /// Pairs the table has never updated are reported as untried
    /// (`q = 0`, `count = 0`) — a state need not have every action
    /// pre-populated.
    pub fn estimates(
        &self,
        state: &StateKey,
        catalog: &ActionCatalog,
    ) -> BTreeMap<String, ValueEstimate> {
        let known = self.table.get(state);
        catalog
            .names()
            .map(|name| {
                let estimate = known
                    .and_then(|m| m.get(name))
                    .cloned()
                    .unwrap_or_else(ValueEstimate::untried);
                (name.to_string(), estimate)
            })
            .collect()
    }

    /// Best learned estimate for a state; 0 when the state is unknown.
    pub fn max_q(&self, state: &StateKey) -> f32 {
        self.table
            .get(state)
            .and_then(|actions| actions.values().map(|e| e.q).reduce(f32::max))
            .unwrap_or(0.0)
    }

    /// Apply one Q-learning update and return the new estimate.
    ///
    /// `q ← q + α · (r + γ · max_a' q(next, a') − q)`; an absent or unknown
    /// `next_state` contributes a discounted term of 0 (terminal step).
    /// Also increments the pair's usage count and the state's visit count,
    /// so `visits(s) ≥ max_a count(s, a)` holds after any update sequence.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: &str,
        reward: f32,
        next_state: Option<&StateKey>,
    ) -> Result<ValueEstimate> {
        if !reward.is_finite() {
            return Err(QTableError::NonFiniteReward(reward));
        }

        let max_future_q = next_state.map(|s| self.max_q(s)).unwrap_or(0.0);

        let entry = self
            .table
            .entry(state.clone())
            .or_default()
            .entry(action.to_string())
            .or_insert_with(ValueEstimate::untried);

        entry.q += self.params.learning_rate
            * (reward + self.params.discount_factor * max_future_q - entry.q);
        entry.count += 1;
        entry.last_updated = iso8601_now();
        let updated = entry.clone();

        *self.visits.entry(state.clone()).or_insert(0) += 1;

        Ok(updated)
    }

    /// Decay epsilon toward its configured floor; returns the new value.
    pub fn decay_epsilon(&mut self) -> f32 {
        self.params.epsilon =
            (self.params.epsilon * self.params.epsilon_decay).max(self.params.epsilon_min);
        self.params.epsilon
    }

    pub(crate) fn from_parts(
        params: LearningParams,
        table: BTreeMap<StateKey, BTreeMap<String, ValueEstimate>>,
        visits: BTreeMap<StateKey, u64>,
    ) -> Self {
        Self {
            params,
            table,
            visits,
        }
    }

    pub(crate) fn table(&self) -> &BTreeMap<StateKey, BTreeMap<String, ValueEstimate>> {
        &self.table
    }

    pub(crate) fn visit_map(&self) -> &BTreeMap<StateKey, u64> {
        &self.visits
    }
}

pub(crate) fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Recoverable-condition reporting hook: structured with the `telemetry`
/// feature, stderr without it.
pub(crate) fn warn_recoverable(msg: &str) {
    #[cfg(feature = "telemetry")]
    tracing::warn!(target: "heimakt_qtable", "{msg}");
    #[cfg(not(feature = "telemetry"))]
    eprintln!("heimakt-qtable: {msg}");
}
