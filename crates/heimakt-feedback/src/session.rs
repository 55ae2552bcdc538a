//! Episode accounting over closed task records.
//!
//! The tracker accumulates finished [`TaskRecord`]s for the live episode
//! and folds them into an [`EpisodeSummary`] when the episode is closed.
//! Closing an episode with no tasks is well-defined: all aggregates are
//! zero and a summary record is still appended to history.

use heimakt_core::TaskRecord;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Aggregates of one closed episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based episode index.
    pub episode: u32,
    pub tasks: usize,
    pub total_reward: f32,
    pub average_reward: f32,
    pub average_confidence: f32,
    /// Fraction of tasks whose execution succeeded.
    pub success_rate: f32,
    /// Fraction of tasks that received recognizable feedback.
    pub feedback_ratio: f32,
    /// Exploration rate at the time the episode closed.
    pub final_epsilon: f32,
    /// ISO-8601 close timestamp.
    pub closed_at: String,
}

/// Live episode state plus the history of closed episodes.
#[derive(Debug, Default)]
pub struct SessionTracker {
    episode: u32,
    records: Vec<TaskRecord>,
    history: Vec<EpisodeSummary>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a closed task record into the live episode.
    pub fn record(&mut self, record: TaskRecord) {
        self.records.push(record);
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn task_count(&self) -> usize {
        self.records.len()
    }

    pub fn live_records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn history(&self) -> &[EpisodeSummary] {
        &self.history
    }

    pub fn success_rate(&self) -> f32 {
        ratio(
            self.records.iter().filter(|r| r.outcome.success).count(),
            self.records.len(),
        )
    }

    pub fn feedback_ratio(&self) -> f32 {
        ratio(
            self.records.iter().filter(|r| r.feedback.is_some()).count(),
            self.records.len(),
        )
    }

    pub fn average_confidence(&self) -> f32 {
        mean(self.records.iter().map(|r| r.confidence.score))
    }

    pub fn average_reward(&self) -> f32 {
        mean(self.records.iter().map(|r| r.reward.total()))
    }

    pub fn total_reward(&self) -> f32 {
        self.records.iter().map(|r| r.reward.total()).sum()
    }

    /// Close the live episode: aggregate, append to history, reset.
    ///
    /// Idempotent in the sense that a second call without new tasks closes
    /// an empty episode with zero aggregates rather than faulting.
    pub fn end_episode(&mut self, final_epsilon: f32) -> EpisodeSummary {
        let summary = EpisodeSummary {
            episode: self.episode,
            tasks: self.records.len(),
            total_reward: self.total_reward(),
            average_reward: self.average_reward(),
            average_confidence: self.average_confidence(),
            success_rate: self.success_rate(),
            feedback_ratio: self.feedback_ratio(),
            final_epsilon,
            closed_at: iso8601_now(),
        };

        self.history.push(summary.clone());
        self.records.clear();
        self.episode += 1;
        summary
    }
}

fn ratio(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        part as f32 / whole as f32
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0_f32;
    let mut n = 0_usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        sum / n as f32
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use heimakt_core::{
        ConfidenceCategory, ConfidenceComponents, ConfidenceReport, ExecutionOutcome,
        RewardBreakdown, StateKey,
    };

    fn record(success: bool, confidence: f32, reward: f32, feedback: Option<&str>) -> TaskRecord {
        TaskRecord {
            task_id: "TASK_1_0001".to_string(),
            description: "take a screenshot".to_string(),
            intent: "take_screenshot".to_string(),
            state: StateKey::derive("take_screenshot", None),
            action: "take_screenshot".to_string(),
            q_values: Default::default(),
            confidence: ConfidenceReport {
                score: confidence,
                category: ConfidenceCategory::Medium,
                components: ConfidenceComponents::default(),
            },
            next_best: vec![],
            outcome: if success {
                ExecutionOutcome::success("ok")
            } else {
                ExecutionOutcome::failure("nope")
            },
            reward: RewardBreakdown {
                internal: reward,
                ..Default::default()
            },
            feedback: feedback.map(str::to_string),
            ts: iso8601_now(),
        }
    }

    #[test]
    fn aggregates_follow_the_recorded_tasks() {
        let mut tracker = SessionTracker::new();
        tracker.record(record(true, 0.8, 1.5, Some("positive")));
        tracker.record(record(true, 0.4, 1.0, None));
        tracker.record(record(false, 0.2, -1.0, Some("negative")));

        assert_eq!(tracker.task_count(), 3);
        assert!((tracker.success_rate() - 2.0 / 3.0).abs() < 1e-6);
        assert!((tracker.feedback_ratio() - 2.0 / 3.0).abs() < 1e-6);
        assert!((tracker.average_confidence() - 0.466_666_67).abs() < 1e-6);
        assert!((tracker.total_reward() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn end_episode_aggregates_and_resets() {
        let mut tracker = SessionTracker::new();
        tracker.record(record(true, 0.6, 1.0, Some("positive")));

        let summary = tracker.end_episode(0.18);
        assert_eq!(summary.episode, 0);
        assert_eq!(summary.tasks, 1);
        assert!((summary.success_rate - 1.0).abs() < f32::EPSILON);
        assert!((summary.final_epsilon - 0.18).abs() < f32::EPSILON);
        assert!(!summary.closed_at.is_empty());

        assert_eq!(tracker.task_count(), 0);
        assert_eq!(tracker.episode(), 1);
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn empty_episode_closes_with_zeroed_aggregates() {
        let mut tracker = SessionTracker::new();
        let summary = tracker.end_episode(0.2);

        assert_eq!(summary.tasks, 0);
        assert_eq!(summary.total_reward, 0.0);
        assert_eq!(summary.average_confidence, 0.0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.feedback_ratio, 0.0);
        assert!(summary.average_reward.is_finite());
        assert_eq!(tracker.history().len(), 1);

        // Closing twice in a row appends another well-defined record.
        let again = tracker.end_episode(0.2);
        assert_eq!(again.episode, 1);
        assert_eq!(tracker.history().len(), 2);
    }

    #[test]
    fn summary_serializes_to_json() {
        let mut tracker = SessionTracker::new();
        tracker.record(record(true, 0.9, 1.5, None));
        let summary = tracker.end_episode(0.15);

        let json = serde_json::to_string(&summary).unwrap();
        let back: EpisodeSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
