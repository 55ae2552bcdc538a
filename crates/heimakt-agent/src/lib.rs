#![warn(clippy::unwrap_used, clippy::expect_used)]

//! The decision engine: one task at a time, from free text to a learned
//! update.
//!
//! A task moves through `Created → IntentResolved → ActionSelected →
//! Executed → FeedbackPending → Closed`. [`DecisionEngine::process_task`]
//! drives everything up to `FeedbackPending` synchronously; the task then
//! waits (indefinitely, if need be) for [`receive_feedback`] or
//! [`skip_feedback`] to close it. There is no rollback past `Executed` —
//! the internal reward has already been applied and can only be
//! compensated by a later feedback-driven update.
//!
//! The engine is a single logical decision stream: at most one task is in
//! flight per instance, and all mutation happens through `&mut self`.
//! Callers that share an engine across threads wrap it in one mutex.
//!
//! [`receive_feedback`]: DecisionEngine::receive_feedback
//! [`skip_feedback`]: DecisionEngine::skip_feedback

pub mod error;

pub use error::{AgentError, Result};

use heimakt_core::{
    ActionCatalog, ActionId, Executor, IntentParser, StateKey, Suggestion, TaskRecord,
};
use heimakt_feedback::{accepted_suggestion, compose, FeedbackSignal, SessionTracker};
use heimakt_feedback::{EpisodeSummary, CORRECTION_BOOST, CORRECTION_PENALTY};
use heimakt_qtable::{confidence, LearningParams, LoadSource, PolicyPaths, QTable, ValueEstimate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// How many next-best alternatives a task record carries.
const NEXT_BEST_COUNT: usize = 2;
/// How many suggestions [`DecisionEngine::suggest_actions`] returns.
const SUGGESTION_COUNT: usize = 3;

/// Table-plus-session statistics for reporting surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningStatistics {
    pub total_states: usize,
    pub total_pairs: usize,
    pub exploration_rate: f32,
    pub most_visited: Vec<(String, u64)>,
    pub session_tasks: usize,
    pub session_success_rate: f32,
    pub session_average_reward: f32,
    pub session_average_confidence: f32,
    pub session_feedback_ratio: f32,
    pub episodes_closed: usize,
}

/// A ranked action suggestion with its reasoning, for advisory surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSuggestion {
    pub action: String,
    pub confidence: f32,
    pub reasoning: String,
}

/// Orchestrates policy store, confidence scorer, reward composer and
/// session tracker around externally-supplied executor and intent parser.
pub struct DecisionEngine<E, P> {
    catalog: ActionCatalog,
    table: QTable,
    tracker: SessionTracker,
    executor: E,
    parser: P,
    paths: PolicyPaths,
    pending: Option<TaskRecord>,
    load_source: LoadSource,
}

impl<E: Executor, P: IntentParser> DecisionEngine<E, P> {
    /// Build an engine, reconstructing any previously persisted policy
    /// from `paths` (see [`QTable::load`] for the fallback chain).
    pub fn new(
        catalog: ActionCatalog,
        executor: E,
        parser: P,
        params: LearningParams,
        paths: PolicyPaths,
    ) -> Self {
        let (table, load_source) = QTable::load(&paths, params);
        Self {
            catalog,
            table,
            tracker: SessionTracker::new(),
            executor,
            parser,
            paths,
            pending: None,
            load_source,
        }
    }

    /// Which persisted form the policy was reconstructed from at startup.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn epsilon(&self) -> f32 {
        self.table.epsilon()
    }

    /// The task currently awaiting feedback, if any.
    pub fn pending_task(&self) -> Option<&TaskRecord> {
        self.pending.as_ref()
    }

    /// Run one full decision cycle up to `FeedbackPending`.
    ///
    /// A task already awaiting feedback is closed via the skip path first —
    /// feedback is optional and must never block the next decision. An
    /// unresolvable intent rejects the task before any state is touched.
    pub fn process_task(
        &mut self,
        description: &str,
        context: Option<&BTreeMap<String, Value>>,
    ) -> Result<TaskRecord> {
        let intent = self
            .parser
            .parse(description)
            .ok_or_else(|| AgentError::UnresolvableIntent(description.to_string()))?;

        self.skip_feedback();

        let state = StateKey::derive(&intent, context);
        let estimates = self.table.estimates(&state, &self.catalog);

        let chosen = self.select_action(&estimates);
        let action = self.catalog.name(chosen).to_string();
        let confidence = confidence::score(&action, &estimates);
        let next_best = next_best(&estimates, &action, &self.catalog);

        let empty = BTreeMap::new();
        let params = context.unwrap_or(&empty);
        let outcome = self.executor.execute(&action, params);

        let spec = self.catalog.spec(chosen);
        let breakdown = compose(spec, outcome.success, None, false);
        self.table
            .update(&state, &action, breakdown.internal, None)?;

        let record = TaskRecord {
            task_id: task_id(),
            description: description.to_string(),
            intent,
            state,
            action,
            q_values: estimates.iter().map(|(k, v)| (k.clone(), v.q)).collect(),
            confidence,
            next_best,
            outcome,
            reward: breakdown,
            feedback: None,
            ts: iso8601_now(),
        };
        self.pending = Some(record.clone());
        Ok(record)
    }

    /// Close the pending task with human feedback.
    ///
    /// An unrecognized token degrades to "no feedback" (the task still
    /// closes); an unrecognized suggestion is dropped while the base
    /// feedback reward still applies. Recognized feedback becomes a second
    /// Q-learning update on the same pair; a valid correction adds a
    /// penalty update on the chosen pair and a boost update on the
    /// suggested one.
    pub fn receive_feedback(
        &mut self,
        token: &str,
        suggestion: Option<&str>,
    ) -> Result<TaskRecord> {
        let mut record = self.pending.take().ok_or(AgentError::NoPendingTask)?;

        let signal = FeedbackSignal::parse(token);
        let chosen = self.catalog.require(&record.action)?;
        let spec = self.catalog.spec(chosen);
        let accepted = accepted_suggestion(signal, suggestion, &self.catalog);

        let breakdown = compose(spec, record.outcome.success, signal, accepted.is_some());

        if let Some(signal) = signal {
            self.table
                .update(&record.state, &record.action, signal.reward(), None)?;
        }
        if let Some(suggested) = accepted {
            self.table
                .update(&record.state, &record.action, CORRECTION_PENALTY, None)?;
            self.table
                .update(&record.state, suggested, CORRECTION_BOOST, None)?;
        }

        record.reward = breakdown;
        record.feedback = signal.map(|s| s.as_str().to_string());

        self.table.decay_epsilon();
        self.tracker.record(record.clone());
        Ok(record)
    }

    /// Close the pending task without feedback, if one exists.
    ///
    /// The exploration rate still decays — the step is over either way.
    pub fn skip_feedback(&mut self) -> Option<TaskRecord> {
        let record = self.pending.take()?;
        self.table.decay_epsilon();
        self.tracker.record(record.clone());
        Some(record)
    }

    /// Close the episode: finalize statistics and persist the policy.
    ///
    /// A persistence failure is reported alongside the summary, never
    /// instead of it; the in-memory policy stays valid.
    pub fn end_episode(&mut self) -> (EpisodeSummary, Result<()>) {
        self.skip_feedback();
        let summary = self.tracker.end_episode(self.table.epsilon());
        let persisted = self.table.save(&self.paths).map_err(AgentError::from);
        (summary, persisted)
    }

    /// Ranked suggestions for a described context, or for the most-visited
    /// state when no context is given.
    pub fn suggest_actions(&self, context: Option<&str>) -> Vec<ActionSuggestion> {
        let state = context
            .and_then(|c| self.parser.parse(c))
            .map(|intent| StateKey::derive(&intent, None))
            .or_else(|| self.table.most_visited(1).into_iter().next().map(|(s, _)| s));

        let Some(state) = state else {
            // Nothing learned yet: lead with the catalog's first actions.
            return self
                .catalog
                .names()
                .take(NEXT_BEST_COUNT)
                .map(|name| ActionSuggestion {
                    action: name.to_string(),
                    confidence: 0.5,
                    reasoning: "no learned history yet".to_string(),
                })
                .collect();
        };

        let estimates = self.table.estimates(&state, &self.catalog);
        let mut ranked: Vec<(&String, &ValueEstimate)> = estimates.iter().collect();
        ranked.sort_by(|a, b| b.1.q.partial_cmp(&a.1.q).unwrap_or(std::cmp::Ordering::Equal));

        ranked
            .into_iter()
            .take(SUGGESTION_COUNT)
            .map(|(name, estimate)| ActionSuggestion {
                action: name.clone(),
                confidence: confidence::score(name, &estimates).score,
                reasoning: format!(
                    "q-value {:.2}, tried {} times",
                    estimate.q, estimate.count
                ),
            })
            .collect()
    }

    pub fn statistics(&self) -> LearningStatistics {
        LearningStatistics {
            total_states: self.table.state_count(),
            total_pairs: self.table.pair_count(),
            exploration_rate: self.table.epsilon(),
            most_visited: self
                .table
                .most_visited(5)
                .into_iter()
                .map(|(s, v)| (s.as_str().to_string(), v))
                .collect(),
            session_tasks: self.tracker.task_count(),
            session_success_rate: self.tracker.success_rate(),
            session_average_reward: self.tracker.average_reward(),
            session_average_confidence: self.tracker.average_confidence(),
            session_feedback_ratio: self.tracker.feedback_ratio(),
            episodes_closed: self.tracker.history().len(),
        }
    }

    /// Epsilon-greedy selection over the full catalog.
    ///
    /// Exploit ties break by lowest usage count, then catalog order.
    fn select_action(&self, estimates: &BTreeMap<String, ValueEstimate>) -> ActionId {
        let mut rng = rand::thread_rng();
        if rng.gen::<f32>() < self.table.epsilon() {
            return ActionId(rng.gen_range(0..self.catalog.len()));
        }

        let mut best: Option<(ActionId, f32, u64)> = None;
        for (id, spec) in self.catalog.iter() {
            let (q, count) = estimates
                .get(spec.name.as_str())
                .map(|e| (e.q, e.count))
                .unwrap_or((0.0, 0));
            let better = match best {
                None => true,
                Some((_, best_q, best_count)) => q > best_q || (q == best_q && count < best_count),
            };
            if better {
                best = Some((id, q, count));
            }
        }
        best.map(|(id, _, _)| id).unwrap_or(ActionId(0))
    }
}

/// Top alternatives by value estimate, excluding the chosen action.
///
/// Ties keep catalog order, so the ranking is deterministic on a fresh
/// state.
fn next_best(
    estimates: &BTreeMap<String, ValueEstimate>,
    chosen: &str,
    catalog: &ActionCatalog,
) -> Vec<Suggestion> {
    let mut ranked: Vec<Suggestion> = catalog
        .names()
        .filter(|name| *name != chosen)
        .map(|name| Suggestion {
            action: name.to_string(),
            q_value: estimates.get(name).map(|e| e.q).unwrap_or(0.0),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.q_value
            .partial_cmp(&a.q_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(NEXT_BEST_COUNT);
    ranked
}

fn task_id() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "TASK_{}_{:04}",
        OffsetDateTime::now_utc().unix_timestamp(),
        rng.gen_range(0..10_000)
    )
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use heimakt_core::{ActionSpec, ExecutionOutcome};
    use std::collections::BTreeSet;

    /// Executor that succeeds unless the action name is in its fail set.
    struct ScriptedExecutor {
        fail: BTreeSet<String>,
    }

    impl ScriptedExecutor {
        fn reliable() -> Self {
            Self {
                fail: BTreeSet::new(),
            }
        }

        fn failing(action: &str) -> Self {
            let mut fail = BTreeSet::new();
            fail.insert(action.to_string());
            Self { fail }
        }
    }

    impl Executor for ScriptedExecutor {
        fn execute(&mut self, action: &str, _params: &BTreeMap<String, Value>) -> ExecutionOutcome {
            if self.fail.contains(action) {
                ExecutionOutcome::failure(format!("{action} failed"))
            } else {
                ExecutionOutcome::success(format!("{action} done"))
                    .with_metadata("simulated", Value::Bool(true))
            }
        }
    }

    /// Parser that accepts exact action names and nothing else.
    struct ExactParser {
        known: BTreeSet<String>,
    }

    impl IntentParser for ExactParser {
        fn parse(&self, description: &str) -> Option<String> {
            let normalized = description.trim().to_lowercase();
            self.known.contains(&normalized).then_some(normalized)
        }
    }

    fn catalog() -> ActionCatalog {
        ActionCatalog::new(vec![
            ActionSpec::new("take_screenshot").complex(),
            ActionSpec::new("show_system_info").complex(),
            ActionSpec::new("mute_audio").critical(),
        ])
        .unwrap()
    }

    fn parser() -> ExactParser {
        ExactParser {
            known: catalog().names().map(str::to_string).collect(),
        }
    }

    fn temp_paths(tag: &str) -> PolicyPaths {
        let dir =
            std::env::temp_dir().join(format!("heimakt_agent_{}_{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        PolicyPaths::in_dir(&dir)
    }

    fn greedy_engine(tag: &str) -> DecisionEngine<ScriptedExecutor, ExactParser> {
        let params = LearningParams {
            epsilon: 0.0, // no exploration: selection is deterministic
            ..LearningParams::default()
        };
        DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params,
            temp_paths(tag),
        )
    }

    #[test]
    fn fresh_policy_breaks_ties_by_catalog_order() {
        let mut engine = greedy_engine("tie_break");
        let record = engine.process_task("take_screenshot", None).unwrap();

        // All estimates are 0, so the first catalog action wins.
        assert_eq!(record.action, "take_screenshot");
        assert!(record.outcome.success);

        // First update: q = 0 + 0.1 * (1.5 - 0), internal reward only.
        let estimates = engine
            .table()
            .estimates(&record.state, engine.catalog());
        let shot = &estimates["take_screenshot"];
        assert!((shot.q - 0.15).abs() < 1e-6);
        assert_eq!(shot.count, 1);
        assert!((record.reward.internal - 1.5).abs() < f32::EPSILON);
        assert_eq!(record.reward.feedback, 0.0);
    }

    #[test]
    fn next_best_excludes_the_chosen_action() {
        let mut engine = greedy_engine("next_best");
        let record = engine.process_task("take_screenshot", None).unwrap();

        assert_eq!(record.next_best.len(), 2);
        assert!(record.next_best.iter().all(|s| s.action != record.action));
        // Fresh state: alternatives keep catalog order.
        assert_eq!(record.next_best[0].action, "show_system_info");
        assert_eq!(record.next_best[1].action, "mute_audio");
    }

    #[test]
    fn correction_penalizes_chosen_and_boosts_suggested() {
        let mut engine = greedy_engine("correction");
        let record = engine.process_task("take_screenshot", None).unwrap();
        let state = record.state.clone();

        let closed = engine
            .receive_feedback("negative", Some("show_system_info"))
            .unwrap();

        assert_eq!(closed.feedback.as_deref(), Some("negative"));
        assert!((closed.reward.feedback + 0.5).abs() < f32::EPSILON);
        assert!((closed.reward.correction_boost - 1.0).abs() < f32::EPSILON);

        let estimates = engine.table().estimates(&state, engine.catalog());
        // Chosen pair was lowered below its post-execution value of 0.15.
        assert!(estimates["take_screenshot"].q < 0.15);
        // Suggested pair was boosted and counted despite never executing.
        let suggested = &estimates["show_system_info"];
        assert!((suggested.q - 0.1).abs() < 1e-6);
        assert_eq!(suggested.count, 1);
    }

    #[test]
    fn unknown_suggestion_keeps_base_feedback_only() {
        let mut engine = greedy_engine("bad_suggestion");
        engine.process_task("take_screenshot", None).unwrap();

        let closed = engine
            .receive_feedback("negative", Some("reboot_datacenter"))
            .unwrap();
        assert_eq!(closed.reward.correction_boost, 0.0);
        assert!((closed.reward.feedback + 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn unrecognized_feedback_token_closes_without_updates() {
        let mut engine = greedy_engine("odd_token");
        let record = engine.process_task("take_screenshot", None).unwrap();
        let count_before = engine
            .table()
            .estimates(&record.state, engine.catalog())["take_screenshot"]
            .count;

        let closed = engine.receive_feedback("shrug", None).unwrap();
        assert!(closed.feedback.is_none());
        assert_eq!(closed.reward.feedback, 0.0);

        let count_after = engine
            .table()
            .estimates(&record.state, engine.catalog())["take_screenshot"]
            .count;
        assert_eq!(count_before, count_after);
    }

    #[test]
    fn unresolvable_intent_mutates_nothing() {
        let mut engine = greedy_engine("no_intent");
        let err = engine.process_task("interpretive dance", None).unwrap_err();
        assert!(matches!(err, AgentError::UnresolvableIntent(_)));
        assert_eq!(engine.table().state_count(), 0);
        assert!(engine.pending_task().is_none());
    }

    #[test]
    fn executor_failure_is_a_negative_outcome_not_an_error() {
        let params = LearningParams {
            epsilon: 0.0,
            ..LearningParams::default()
        };
        let mut engine = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::failing("take_screenshot"),
            parser(),
            params,
            temp_paths("exec_failure"),
        );

        let record = engine.process_task("take_screenshot", None).unwrap();
        assert!(!record.outcome.success);
        // Complex flag only raises the success reward; failure is -1.0.
        assert!((record.reward.internal + 1.0).abs() < f32::EPSILON);

        let estimates = engine.table().estimates(&record.state, engine.catalog());
        assert!(estimates["take_screenshot"].q < 0.0);
    }

    #[test]
    fn feedback_without_pending_task_errors() {
        let mut engine = greedy_engine("no_pending");
        let err = engine.receive_feedback("positive", None).unwrap_err();
        assert!(matches!(err, AgentError::NoPendingTask));
    }

    #[test]
    fn epsilon_decays_when_a_task_closes() {
        let params = LearningParams {
            epsilon: 0.2,
            ..LearningParams::default()
        };
        let mut engine = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params,
            temp_paths("decay"),
        );
        // Pin selection determinism is irrelevant here; only decay matters.
        engine.process_task("mute_audio", None).unwrap();
        engine.receive_feedback("positive", None).unwrap();
        assert!((engine.epsilon() - 0.2 * 0.995).abs() < 1e-6);

        engine.process_task("mute_audio", None).unwrap();
        engine.skip_feedback().unwrap();
        assert!((engine.epsilon() - 0.2 * 0.995 * 0.995).abs() < 1e-6);
    }

    #[test]
    fn new_task_closes_the_pending_one_via_skip() {
        let mut engine = greedy_engine("auto_close");
        engine.process_task("take_screenshot", None).unwrap();
        engine.process_task("mute_audio", None).unwrap();

        // The first task landed in the tracker without feedback.
        assert_eq!(engine.tracker().task_count(), 1);
        assert!(engine.tracker().live_records()[0].feedback.is_none());
        assert!(engine.pending_task().is_some());
    }

    #[test]
    fn identical_requests_build_identical_states() {
        let mut engine = greedy_engine("state_determinism");
        let mut ctx = BTreeMap::new();
        ctx.insert("monitor".to_string(), Value::String("main".to_string()));

        let first = engine.process_task("take_screenshot", Some(&ctx)).unwrap();
        engine.skip_feedback();
        let second = engine.process_task("take_screenshot", Some(&ctx)).unwrap();

        assert_eq!(first.state, second.state);
    }

    #[test]
    fn end_episode_persists_and_summarizes() {
        let mut engine = greedy_engine("episode");
        engine.process_task("take_screenshot", None).unwrap();
        engine.receive_feedback("positive", None).unwrap();

        let (summary, persisted) = engine.end_episode();
        assert!(persisted.is_ok());
        assert_eq!(summary.tasks, 1);
        assert!((summary.success_rate - 1.0).abs() < f32::EPSILON);
        assert!((summary.feedback_ratio - 1.0).abs() < f32::EPSILON);

        // A second close without tasks yields a defined, empty summary.
        let (empty, persisted) = engine.end_episode();
        assert!(persisted.is_ok());
        assert_eq!(empty.tasks, 0);
        assert_eq!(empty.success_rate, 0.0);
        assert_eq!(empty.episode, 1);
    }

    #[test]
    fn persistence_failure_still_finalizes_the_episode() {
        let base = std::env::temp_dir().join(format!(
            "heimakt_agent_blocked_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&base);
        std::fs::create_dir_all(&base).unwrap();
        let blocker = base.join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let params = LearningParams {
            epsilon: 0.0,
            ..LearningParams::default()
        };
        let mut engine = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params,
            PolicyPaths::in_dir(blocker.join("models")),
        );
        engine.process_task("take_screenshot", None).unwrap();
        engine.receive_feedback("positive", None).unwrap();

        let (summary, persisted) = engine.end_episode();
        assert!(persisted.is_err());
        // Statistics are finalized regardless of the failed save.
        assert_eq!(summary.tasks, 1);
        assert_eq!(engine.tracker().history().len(), 1);
    }

    #[test]
    fn end_episode_closes_a_pending_task_first() {
        let mut engine = greedy_engine("episode_pending");
        engine.process_task("take_screenshot", None).unwrap();

        let (summary, _) = engine.end_episode();
        assert_eq!(summary.tasks, 1);
        assert!(engine.pending_task().is_none());
    }

    #[test]
    fn exploration_still_reports_confidence() {
        let params = LearningParams {
            epsilon: 1.0, // always explore
            epsilon_min: 1.0,
            ..LearningParams::default()
        };
        let mut engine = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params,
            temp_paths("explore"),
        );

        let record = engine.process_task("take_screenshot", None).unwrap();
        assert!(engine.catalog().contains(&record.action));
        assert!((0.0..=1.0).contains(&record.confidence.score));
    }

    #[test]
    fn suggestions_rank_learned_actions_first() {
        let mut engine = greedy_engine("suggest");
        engine.process_task("take_screenshot", None).unwrap();
        engine.receive_feedback("positive", None).unwrap();

        let suggestions = engine.suggest_actions(Some("take_screenshot"));
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].action, "take_screenshot");
        assert!(suggestions[0].confidence > 0.0);
        assert!(suggestions[0].reasoning.contains("tried"));
    }

    #[test]
    fn suggestions_fall_back_to_catalog_defaults() {
        let engine = greedy_engine("suggest_empty");
        let suggestions = engine.suggest_actions(None);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].action, "take_screenshot");
        assert_eq!(suggestions[0].reasoning, "no learned history yet");
    }

    #[test]
    fn restart_resumes_from_the_persisted_policy() {
        let paths = temp_paths("resume");
        let params = LearningParams {
            epsilon: 0.0,
            ..LearningParams::default()
        };
        let mut engine = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params.clone(),
            paths.clone(),
        );
        assert_eq!(engine.load_source(), LoadSource::Empty);
        engine.process_task("take_screenshot", None).unwrap();
        engine.receive_feedback("positive", None).unwrap();
        let (_, persisted) = engine.end_episode();
        assert!(persisted.is_ok());
        let trained_pairs = engine.table().pair_count();

        let restarted = DecisionEngine::new(
            catalog(),
            ScriptedExecutor::reliable(),
            parser(),
            params,
            paths,
        );
        assert_eq!(restarted.load_source(), LoadSource::Authoritative);
        assert_eq!(restarted.table().pair_count(), trained_pairs);
    }
}
