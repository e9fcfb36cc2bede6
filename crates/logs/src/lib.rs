//! SummaryBench persisted logs
//!
//! Two append-only tabular logs (per-strategy evaluations and per-run
//! usage) behind a store abstraction, plus the aggregation routines that
//! replay them into per-strategy and usage summaries.

mod aggregate;
mod evaluation;
mod store;
mod usage;

pub use aggregate::{
    estimate_cost, recent_usage, summarize_by_strategy, summarize_evaluations, summarize_usage,
    EvaluationSummary, StrategyAggregate, UsageAggregate,
};
pub use evaluation::{EvaluationRecord, EVALUATION_COLUMNS};
pub use store::{
    format_float, now_timestamp, parse_timestamp, timestamp_cell, CsvLog, LogRecord, LogStore,
    MemoryLog, Recorded, RowView, SCHEMA_VERSION, TIMESTAMP_FORMAT,
};
pub use usage::{UsageRecord, USAGE_COLUMNS};
