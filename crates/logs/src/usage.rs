use chrono::NaiveDateTime;
use serde::Serialize;
use summarybench_common::{InputSource, LengthSetting, Tone};
use summarybench_metrics::round_to;
use tracing::debug;

use crate::aggregate::estimate_cost;
use crate::store::{format_float, now_timestamp, timestamp_cell, LogRecord, Recorded, RowView};

/// Usage log columns, schema v1
pub const USAGE_COLUMNS: &[&str] = &[
    "timestamp",
    "input_length",
    "summary_length",
    "compression_ratio",
    "summary_tone",
    "summary_length_setting",
    "input_source",
    "file_type",
    "api_cost_estimate",
    "processing_time_seconds",
];

const NO_FILE_TYPE: &str = "N/A";

/// One summarization run, with or without a reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    /// `None` only for replayed rows whose timestamp cell could not be parsed
    pub timestamp: Option<NaiveDateTime>,
    pub input_length: usize,
    pub output_length: usize,
    /// `None` only for historical rows whose cell could not be parsed
    pub compression_ratio: Option<f64>,
    pub tone: Recorded<Tone>,
    pub length_setting: Recorded<LengthSetting>,
    pub input_source: Recorded<InputSource>,
    pub file_type: Option<String>,
    pub estimated_cost_usd: f64,
    /// `None` only for historical rows whose cell could not be parsed
    pub processing_time_seconds: Option<f64>,
}

impl UsageRecord {
    /// Stamp a new record and price it with the token-rate estimate
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input_length: usize,
        output_length: usize,
        compression_ratio: f64,
        tone: Tone,
        length_setting: LengthSetting,
        input_source: InputSource,
        file_type: Option<String>,
        processing_time_seconds: f64,
    ) -> Self {
        Self {
            timestamp: Some(now_timestamp()),
            input_length,
            output_length,
            compression_ratio: Some(compression_ratio),
            tone: tone.into(),
            length_setting: length_setting.into(),
            input_source: input_source.into(),
            file_type: file_type.filter(|t| !t.is_empty()),
            estimated_cost_usd: estimate_cost(input_length, output_length),
            processing_time_seconds: Some(round_to(processing_time_seconds, 2)),
        }
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

impl LogRecord for UsageRecord {
    const COLUMNS: &'static [&'static str] = USAGE_COLUMNS;

    fn to_row(&self) -> Vec<String> {
        vec![
            timestamp_cell(self.timestamp),
            self.input_length.to_string(),
            self.output_length.to_string(),
            optional_cell(self.compression_ratio),
            self.tone.to_string(),
            self.length_setting.to_string(),
            self.input_source.to_string(),
            self.file_type.clone().unwrap_or_else(|| NO_FILE_TYPE.to_string()),
            format_float(self.estimated_cost_usd),
            optional_cell(self.processing_time_seconds),
        ]
    }

    fn from_row(row: &RowView<'_>) -> Option<Self> {
        if row.is_blank() {
            return None;
        }
        let timestamp = row.timestamp("timestamp");
        let tone = row.recorded::<Tone>("summary_tone");
        let length_setting = row.recorded::<LengthSetting>("summary_length_setting");
        let input_source = row.recorded::<InputSource>("input_source");

        let file_type = row
            .get("file_type")
            .filter(|t| !t.is_empty() && *t != NO_FILE_TYPE)
            .map(str::to_string);

        let compression_ratio = row.f64_opt("compression_ratio");
        let processing_time_seconds = row.f64_opt("processing_time_seconds");
        if compression_ratio.is_none() || processing_time_seconds.is_none() {
            debug!("Usage row has unparsable ratio/time cells");
        }

        Some(Self {
            timestamp,
            input_length: row.usize_or_zero("input_length"),
            output_length: row.usize_or_zero("summary_length"),
            compression_ratio,
            tone,
            length_setting,
            input_source,
            file_type,
            estimated_cost_usd: row.f64_or_zero("api_cost_estimate"),
            processing_time_seconds,
        })
    }
}
