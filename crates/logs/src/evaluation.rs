use chrono::NaiveDateTime;
use serde::Serialize;
use summarybench_metrics::{round_to, BasicMetrics, ReadabilityMetrics, ScoreSet};
use tracing::debug;

use crate::store::{format_float, now_timestamp, timestamp_cell, LogRecord, RowView};

/// Evaluation log columns, schema v1
pub const EVALUATION_COLUMNS: &[&str] = &[
    "timestamp",
    "prompt_version",
    "input_length",
    "rouge1_score",
    "rouge2_score",
    "rougeL_score",
    "average_rouge",
    "word_overlap_pct",
    "compression_ratio",
    "readability_score",
    "processing_time",
];

/// One strategy run that was scored against a reference
///
/// Missing overlap scores are persisted as `0.0`, so a replayed record
/// cannot tell "no scores" apart from "scored zero".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// `None` only for replayed rows whose timestamp cell could not be parsed
    pub timestamp: Option<NaiveDateTime>,
    pub strategy_id: String,
    pub input_length: usize,
    pub score_set: ScoreSet,
    pub word_overlap_pct: f64,
    pub compression_ratio: f64,
    pub readability_score: u32,
    pub processing_time_seconds: f64,
}

impl EvaluationRecord {
    /// Stamp a new record with the current wall-clock time
    pub fn new(
        strategy_id: impl Into<String>,
        input_length: usize,
        score_set: ScoreSet,
        basic: &BasicMetrics,
        readability: &ReadabilityMetrics,
        processing_time_seconds: f64,
    ) -> Self {
        Self {
            timestamp: Some(now_timestamp()),
            strategy_id: strategy_id.into(),
            input_length,
            score_set,
            word_overlap_pct: basic.word_overlap_pct,
            compression_ratio: basic.compression_ratio,
            readability_score: readability.readability_score,
            processing_time_seconds: round_to(processing_time_seconds, 2),
        }
    }
}

fn score_cell(score: Option<f64>) -> String {
    format_float(score.unwrap_or(0.0))
}

impl LogRecord for EvaluationRecord {
    const COLUMNS: &'static [&'static str] = EVALUATION_COLUMNS;

    fn to_row(&self) -> Vec<String> {
        vec![
            timestamp_cell(self.timestamp),
            self.strategy_id.clone(),
            self.input_length.to_string(),
            score_cell(self.score_set.unigram_overlap()),
            score_cell(self.score_set.bigram_overlap()),
            score_cell(self.score_set.longest_common_subseq_overlap()),
            score_cell(self.score_set.average()),
            format_float(self.word_overlap_pct),
            format_float(self.compression_ratio),
            self.readability_score.to_string(),
            format_float(self.processing_time_seconds),
        ]
    }

    fn from_row(row: &RowView<'_>) -> Option<Self> {
        let strategy_id = row.get("prompt_version").filter(|id| !id.is_empty())?;
        let timestamp = row.timestamp("timestamp");
        if timestamp.is_none() {
            debug!("Evaluation row for {} has an unparsable timestamp", strategy_id);
        }

        let readability = row.f64_or_zero("readability_score");
        let readability_score = if readability.is_finite() && readability > 0.0 {
            readability.round() as u32
        } else {
            0
        };

        Some(Self {
            timestamp,
            strategy_id: strategy_id.to_string(),
            input_length: row.usize_or_zero("input_length"),
            score_set: ScoreSet::from_persisted(
                row.f64_or_zero("rouge1_score"),
                row.f64_or_zero("rouge2_score"),
                row.f64_or_zero("rougeL_score"),
                row.f64_or_zero("average_rouge"),
            ),
            word_overlap_pct: row.f64_or_zero("word_overlap_pct"),
            compression_ratio: row.f64_or_zero("compression_ratio"),
            readability_score,
            processing_time_seconds: row.f64_or_zero("processing_time"),
        })
    }
}
