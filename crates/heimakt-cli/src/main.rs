//! CLI for heimakt.
//!
//! Provides an interactive learning session plus read-only inspection of a
//! persisted policy. The session drives the decision engine with the
//! built-in keyword parser and simulated executor; every exit path closes
//! the episode so the learned policy is persisted.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heimakt_agent::{ActionSuggestion, DecisionEngine, LearningStatistics};
use heimakt_core::TaskRecord;
use heimakt_feedback::{EpisodeSummary, FeedbackSignal};
use heimakt_qtable::{LearningParams, LoadSource, PolicyPaths, QTable};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

mod actions;
mod intent;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive learning session
    Run {
        /// Directory holding the persisted policy
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,

        /// Override the exploration rate
        #[arg(long)]
        epsilon: Option<f32>,

        /// Override the learning rate
        #[arg(long)]
        learning_rate: Option<f32>,

        /// Override the discount factor
        #[arg(long)]
        discount_factor: Option<f32>,

        /// Override the epsilon decay factor
        #[arg(long)]
        epsilon_decay: Option<f32>,

        /// Override the epsilon floor
        #[arg(long)]
        epsilon_min: Option<f32>,
    },
    /// Print statistics of the persisted policy
    Stats {
        /// Directory holding the persisted policy
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },
    /// Rewrite the tabular export from the persisted policy
    Export {
        /// Directory holding the persisted policy
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model_dir,
            epsilon,
            learning_rate,
            discount_factor,
            epsilon_decay,
            epsilon_min,
        } => {
            let mut params = LearningParams::default();
            if let Some(v) = epsilon {
                params.epsilon = v.clamp(0.0, 1.0);
            }
            if let Some(v) = learning_rate {
                params.learning_rate = v;
            }
            if let Some(v) = discount_factor {
                params.discount_factor = v;
            }
            if let Some(v) = epsilon_decay {
                params.epsilon_decay = v;
            }
            if let Some(v) = epsilon_min {
                params.epsilon_min = v;
            }
            run_session(&model_dir, params)
        }
        Commands::Stats { model_dir } => show_stats(&model_dir),
        Commands::Export { model_dir } => export(&model_dir),
    }
}

fn run_session(model_dir: &Path, params: LearningParams) -> Result<()> {
    let catalog = actions::default_catalog().context("building the action catalog")?;
    let parser = intent::KeywordIntentParser::new(catalog.names().map(str::to_string));
    let mut engine = DecisionEngine::new(
        catalog,
        actions::SimulatedExecutor,
        parser,
        params,
        PolicyPaths::in_dir(model_dir),
    );

    match engine.load_source() {
        LoadSource::Authoritative => println!(
            "Policy loaded from snapshot: {} states, {} pairs.",
            engine.table().state_count(),
            engine.table().pair_count()
        ),
        LoadSource::Tabular => println!(
            "Snapshot unavailable; policy rebuilt from the tabular export: {} states.",
            engine.table().state_count()
        ),
        LoadSource::Empty => println!("No persisted policy found; starting fresh."),
    }
    println!("Enter a task description, feedback (positive/negative, 👍/👎),");
    println!("or a command: stats, suggest, quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "stats" => {
                print_statistics(&engine.statistics());
                continue;
            }
            "suggest" => {
                print_suggestions(&engine.suggest_actions(None));
                continue;
            }
            _ => {}
        }

        if let Some(signal) = FeedbackSignal::parse(input) {
            let suggestion = if signal == FeedbackSignal::Negative {
                prompt_suggestion(&mut lines)?
            } else {
                None
            };
            match engine.receive_feedback(input, suggestion.as_deref()) {
                Ok(record) => println!(
                    "Feedback applied: total reward {:.2}, exploration rate {:.3}.",
                    record.reward.total(),
                    engine.epsilon()
                ),
                Err(err) => eprintln!("{err}"),
            }
            continue;
        }

        match engine.process_task(input, None) {
            Ok(record) => print_record(&record),
            Err(err) => eprintln!("Task not processed: {err}"),
        }
    }

    let (summary, persisted) = engine.end_episode();
    if let Err(err) = persisted {
        eprintln!("Warning: policy not persisted: {err}");
    }
    print_summary(&summary);
    Ok(())
}

fn prompt_suggestion(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<String>> {
    print!("What action should have been taken? (optional): ");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => {
            let line = line?;
            let trimmed = line.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        None => Ok(None),
    }
}

fn print_record(record: &TaskRecord) {
    println!("Intent: {}", record.intent);
    println!(
        "Action: {} (confidence {:.2}, {})",
        record.action, record.confidence.score, record.confidence.category
    );
    if !record.next_best.is_empty() {
        let alternatives: Vec<String> = record
            .next_best
            .iter()
            .map(|s| format!("{} ({:.2})", s.action, s.q_value))
            .collect();
        println!("Next best: {}", alternatives.join(", "));
    }
    println!(
        "{}: {}",
        if record.outcome.success {
            "Success"
        } else {
            "Failed"
        },
        record.outcome.message
    );
    println!("Internal reward: {:.1}", record.reward.internal);
    println!("How was this action? (positive/negative, or just continue)");
}

fn print_statistics(stats: &LearningStatistics) {
    println!("States learned: {}", stats.total_states);
    println!("State-action pairs: {}", stats.total_pairs);
    println!("Exploration rate: {:.3}", stats.exploration_rate);
    println!(
        "Session: {} tasks, success rate {:.2}, average reward {:.2}",
        stats.session_tasks, stats.session_success_rate, stats.session_average_reward
    );
    if !stats.most_visited.is_empty() {
        println!("Most visited states:");
        for (state, visits) in &stats.most_visited {
            println!("  {state} ({visits} visits)");
        }
    }
}

fn print_suggestions(suggestions: &[ActionSuggestion]) {
    println!("Suggested actions:");
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!(
            "{}. {} (confidence {:.2}) - {}",
            i + 1,
            suggestion.action,
            suggestion.confidence,
            suggestion.reasoning
        );
    }
}

fn print_summary(summary: &EpisodeSummary) {
    println!("Episode {} complete:", summary.episode);
    println!("  Tasks: {}", summary.tasks);
    println!("  Total reward: {:.2}", summary.total_reward);
    println!("  Average confidence: {:.2}", summary.average_confidence);
    println!("  Success rate: {:.2}", summary.success_rate);
    println!("  Feedback ratio: {:.2}", summary.feedback_ratio);
    println!("  Exploration rate: {:.3}", summary.final_epsilon);
}

fn show_stats(model_dir: &Path) -> Result<()> {
    let paths = PolicyPaths::in_dir(model_dir);
    let (table, source) = QTable::load(&paths, LearningParams::default());

    let stats = serde_json::json!({
        "source": match source {
            LoadSource::Authoritative => "snapshot",
            LoadSource::Tabular => "tabular",
            LoadSource::Empty => "empty",
        },
        "states": table.state_count(),
        "pairs": table.pair_count(),
        "epsilon": table.epsilon(),
        "most_visited": table
            .most_visited(5)
            .into_iter()
            .map(|(state, visits)| serde_json::json!({
                "state": state.as_str(),
                "visits": visits,
            }))
            .collect::<Vec<_>>(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("rendering statistics")?
    );
    Ok(())
}

fn export(model_dir: &Path) -> Result<()> {
    let paths = PolicyPaths::in_dir(model_dir);
    let (table, source) = QTable::load(&paths, LearningParams::default());
    if source == LoadSource::Empty {
        println!("No persisted policy found; writing an empty export.");
    }
    table
        .save(&paths)
        .with_context(|| format!("writing policy files under {}", model_dir.display()))?;
    println!("Tabular export written to {}", paths.tabular.display());
    println!("Metadata written to {}", paths.metadata.display());
    Ok(())
}
