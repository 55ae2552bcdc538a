use heimakt_core::{ActionCatalog, ActionSpec, StateKey};
use heimakt_qtable::{LearningParams, QTable};
use std::time::Instant;

fn main() {
    let catalog = ActionCatalog::new(vec![
        ActionSpec::new("take_screenshot").complex(),
        ActionSpec::new("show_system_info").complex(),
        ActionSpec::new("mute_audio").critical(),
    ])
    .expect("valid catalog");

    let mut table = QTable::new(LearningParams::default());
    let state = StateKey::derive("take_screenshot", None);

    // Warmup
    for _ in 0..1000 {
        table
            .update(&state, "take_screenshot", 1.0, None)
            .expect("finite reward");
    }

    let iterations = 1_000_000_u32;
    let start = Instant::now();
    for _ in 0..iterations {
        table
            .update(&state, "take_screenshot", 1.0, None)
            .expect("finite reward");
    }
    let duration = start.elapsed();
    println!("Update for an EXISTING pair took: {:?}", duration);
    println!("Average per call: {:?}", duration / iterations);

    // Measure the cold path: every update creates a new state.
    let mut table = QTable::new(LearningParams::default());
    let fresh_states = 10_000_u32;
    let start = Instant::now();
    for i in 0..fresh_states {
        let s = StateKey::from_raw(format!("intent_generated_{i}"));
        table
            .update(&s, "take_screenshot", 1.0, None)
            .expect("finite reward");
    }
    let duration = start.elapsed();
    println!("Update for FRESH states (0..{fresh_states}) took: {:?}", duration);
    println!("Average per call: {:?}", duration / fresh_states);

    // Read path: full-catalog estimate assembly for a learned state.
    let reads = 100_000_u32;
    let start = Instant::now();
    for _ in 0..reads {
        let estimates = table.estimates(&StateKey::from_raw("intent_generated_0"), &catalog);
        std::hint::black_box(estimates);
    }
    let duration = start.elapsed();
    println!("Estimates for a learned state took: {:?}", duration);
    println!("Average per call: {:?}", duration / reads);
}
