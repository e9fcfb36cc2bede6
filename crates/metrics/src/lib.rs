//! SummaryBench quality metrics
//!
//! Pure scoring of a candidate summary against a reference: length and
//! word-overlap figures, a readability heuristic, and ROUGE-1/2/L overlap.

mod overlap;
mod text;
mod tokenize;
mod types;

pub use overlap::{OverlapScorer, ScoringError, DEFAULT_LCS_CELL_LIMIT};
pub use text::{basic_metrics, readability};
pub use tokenize::Tokenizer;
pub use types::{BasicMetrics, ReadabilityMetrics, ScoreSet};

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
