//! SummaryBench comparison runner
//!
//! Wires config, logs and the generation client together and runs one
//! input through several summarization strategies.

mod state;
mod workflow;

pub use state::AppState;
pub use workflow::{
    ComparisonReport, ComparisonRequest, ComparisonRunner, StrategyOutcome, StrategyRun,
};
