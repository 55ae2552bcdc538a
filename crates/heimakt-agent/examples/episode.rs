//! Run one scripted episode from stdin.
//!
//! Input is JSONL, one task per line:
//! `{"description":"take a screenshot","context":{"monitor":"main"},"feedback":"👍","suggestion":null}`
//! Each processed task is echoed as a JSON record; the episode summary is
//! printed when stdin is exhausted.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

use heimakt_agent::DecisionEngine;
use heimakt_core::{
    ActionCatalog, ActionSpec, ExecutionOutcome, Executor, IntentParser, TaskRequest,
};
use heimakt_qtable::{LearningParams, PolicyPaths};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct ScriptLine {
    #[serde(flatten)]
    task: TaskRequest,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Executor that pretends every action works.
struct EchoExecutor;

impl Executor for EchoExecutor {
    fn execute(&mut self, action: &str, _params: &BTreeMap<String, Value>) -> ExecutionOutcome {
        ExecutionOutcome::success(format!("simulated {action}"))
            .with_metadata("simulated", Value::Bool(true))
    }
}

/// Parser that accepts exact catalog names with spaces allowed.
struct NameParser {
    names: Vec<String>,
}

impl IntentParser for NameParser {
    fn parse(&self, description: &str) -> Option<String> {
        let normalized = description.trim().to_lowercase().replace(' ', "_");
        self.names.contains(&normalized).then_some(normalized)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ActionCatalog::new(vec![
        ActionSpec::new("take_screenshot").complex(),
        ActionSpec::new("show_system_info").complex(),
        ActionSpec::new("mute_audio").critical(),
        ActionSpec::new("open_browser"),
    ])?;
    let parser = NameParser {
        names: catalog.names().map(str::to_string).collect(),
    };

    let model_dir = std::env::temp_dir().join("heimakt_episode_example");
    let mut engine = DecisionEngine::new(
        catalog,
        EchoExecutor,
        parser,
        LearningParams::default(),
        PolicyPaths::in_dir(&model_dir),
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let script: ScriptLine = serde_json::from_str(&line)?;

        match engine.process_task(&script.task.description, script.task.context.as_ref()) {
            Ok(record) => {
                let record = match script.feedback.as_deref() {
                    Some(token) => {
                        engine.receive_feedback(token, script.suggestion.as_deref())?
                    }
                    None => record,
                };
                println!("{}", serde_json::to_string(&record)?);
            }
            Err(err) => eprintln!("skipped: {err}"),
        }
    }

    let (summary, persisted) = engine.end_episode();
    if let Err(err) = persisted {
        eprintln!("warning: policy not persisted: {err}");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
