use serde::Serialize;
use std::collections::BTreeMap;
use summarybench_common::{InputSource, LengthSetting, Tone};
use summarybench_metrics::round_to;

use crate::evaluation::EvaluationRecord;
use crate::store::Recorded;
use crate::usage::UsageRecord;

/// USD per 1K input tokens
const INPUT_RATE_PER_1K: f64 = 0.0005;
/// USD per 1K output tokens
const OUTPUT_RATE_PER_1K: f64 = 0.0015;
const CHARS_PER_TOKEN: f64 = 4.0;

/// Linear token-rate cost estimate (4 characters ~ 1 token), rounded to 4 places
pub fn estimate_cost(input_length: usize, output_length: usize) -> f64 {
    let input_tokens = input_length as f64 / CHARS_PER_TOKEN;
    let output_tokens = output_length as f64 / CHARS_PER_TOKEN;
    round_to(
        (input_tokens * INPUT_RATE_PER_1K + output_tokens * OUTPUT_RATE_PER_1K) / 1000.0,
        4,
    )
}

/// Per-strategy rollup of the evaluation log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyAggregate {
    pub strategy_id: String,
    pub count: usize,
    pub avg_unigram: f64,
    pub avg_bigram: f64,
    pub avg_lcs_overlap: f64,
    pub avg_readability: f64,
    pub avg_processing_time: f64,
}

/// Evaluation log rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub by_strategy: BTreeMap<String, StrategyAggregate>,
    pub total_evaluations: usize,
}

/// Usage log rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageAggregate {
    pub total_count: usize,
    pub total_input_chars: usize,
    pub total_output_chars: usize,
    pub avg_processing_time: f64,
    pub avg_compression_ratio: f64,
    pub total_cost_usd: f64,
    pub text_inputs: usize,
    pub file_inputs: usize,
    /// In order of first occurrence; blank cells are not counted
    pub tone_distribution: Vec<(Recorded<Tone>, usize)>,
    /// In order of first occurrence; blank cells are not counted
    pub length_distribution: Vec<(Recorded<LengthSetting>, usize)>,
}

/// Sum in `total_cmp` order so any permutation of the input gives the same bits
fn stable_sum(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

fn stable_mean(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    stable_sum(values) / values.len() as f64
}

#[derive(Default)]
struct StrategySamples {
    unigram: Vec<f64>,
    bigram: Vec<f64>,
    lcs: Vec<f64>,
    readability: Vec<f64>,
    processing_time: Vec<f64>,
}

/// Group records by strategy id and average them
///
/// Missing overlap scores count as `0.0`, matching what a replayed log
/// holds. Strategies without records do not appear.
pub fn summarize_by_strategy(records: &[EvaluationRecord]) -> BTreeMap<String, StrategyAggregate> {
    let mut samples: BTreeMap<&str, StrategySamples> = BTreeMap::new();

    for record in records {
        let entry = samples.entry(record.strategy_id.as_str()).or_default();
        let scores = &record.score_set;
        entry.unigram.push(scores.unigram_overlap().unwrap_or(0.0));
        entry.bigram.push(scores.bigram_overlap().unwrap_or(0.0));
        entry.lcs.push(scores.longest_common_subseq_overlap().unwrap_or(0.0));
        entry.readability.push(f64::from(record.readability_score));
        entry.processing_time.push(record.processing_time_seconds);
    }

    samples
        .into_iter()
        .map(|(strategy_id, mut s)| {
            let aggregate = StrategyAggregate {
                strategy_id: strategy_id.to_string(),
                count: s.unigram.len(),
                avg_unigram: round_to(stable_mean(&mut s.unigram), 3),
                avg_bigram: round_to(stable_mean(&mut s.bigram), 3),
                avg_lcs_overlap: round_to(stable_mean(&mut s.lcs), 3),
                avg_readability: round_to(stable_mean(&mut s.readability), 1),
                avg_processing_time: round_to(stable_mean(&mut s.processing_time), 2),
            };
            (aggregate.strategy_id.clone(), aggregate)
        })
        .collect()
}

pub fn summarize_evaluations(records: &[EvaluationRecord]) -> EvaluationSummary {
    EvaluationSummary {
        by_strategy: summarize_by_strategy(records),
        total_evaluations: records.len(),
    }
}

fn count_first_seen<'a, T: PartialEq + Clone + 'a>(
    values: impl Iterator<Item = &'a Recorded<T>>,
) -> Vec<(Recorded<T>, usize)> {
    let mut counts: Vec<(Recorded<T>, usize)> = Vec::new();
    for value in values.filter(|v| !v.is_blank()) {
        match counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    counts
}

/// Usage statistics; unparsable ratio/time cells are left out of their averages
///
/// Rows with unrecognised tone, length or source values still count
/// towards every total and appear under their raw text.
pub fn summarize_usage(records: &[UsageRecord]) -> UsageAggregate {
    let mut compression: Vec<f64> = records.iter().filter_map(|r| r.compression_ratio).collect();
    let mut times: Vec<f64> = records
        .iter()
        .filter_map(|r| r.processing_time_seconds)
        .collect();
    let mut costs: Vec<f64> = records.iter().map(|r| r.estimated_cost_usd).collect();

    UsageAggregate {
        total_count: records.len(),
        total_input_chars: records.iter().map(|r| r.input_length).sum(),
        total_output_chars: records.iter().map(|r| r.output_length).sum(),
        avg_processing_time: round_to(stable_mean(&mut times), 2),
        avg_compression_ratio: round_to(stable_mean(&mut compression), 2),
        total_cost_usd: round_to(stable_sum(&mut costs), 4),
        text_inputs: records
            .iter()
            .filter(|r| r.input_source == Recorded::Known(InputSource::Text))
            .count(),
        file_inputs: records
            .iter()
            .filter(|r| r.input_source == Recorded::Known(InputSource::File))
            .count(),
        tone_distribution: count_first_seen(records.iter().map(|r| &r.tone)),
        length_distribution: count_first_seen(records.iter().map(|r| &r.length_setting)),
    }
}

/// The last `limit` records, oldest first
pub fn recent_usage(records: &[UsageRecord], limit: usize) -> &[UsageRecord] {
    &records[records.len().saturating_sub(limit)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LogStore, MemoryLog};
    use summarybench_metrics::ScoreSet;

    fn evaluation(strategy: &str, lcs: f64, readability: u32, seconds: f64) -> EvaluationRecord {
        EvaluationRecord {
            timestamp: Some(crate::store::now_timestamp()),
            strategy_id: strategy.to_string(),
            input_length: 500,
            score_set: ScoreSet::from_persisted(lcs, lcs / 2.0, lcs, lcs),
            word_overlap_pct: 40.0,
            compression_ratio: 25.0,
            readability_score: readability,
            processing_time_seconds: seconds,
        }
    }

    fn usage(tone: Tone, length: LengthSetting, source: InputSource) -> UsageRecord {
        UsageRecord::new(400, 100, 25.0, tone, length, source, None, 1.5)
    }

    #[test]
    fn test_cost_estimate() {
        assert_eq!(estimate_cost(0, 0), 0.0);
        assert_eq!(estimate_cost(4000, 800), 0.0008);
        // 10_000 chars in, 2_000 out: (2500 * 0.0005 + 500 * 0.0015) / 1000 = 0.002
        assert_eq!(estimate_cost(10_000, 2_000), 0.002);
        // tiny runs round away to nothing
        assert_eq!(estimate_cost(100, 20), 0.0);
    }

    #[test]
    fn test_two_runs_of_one_strategy() {
        let records = vec![
            evaluation("v1_basic", 0.4, 60, 1.0),
            evaluation("v1_basic", 0.6, 70, 2.0),
        ];
        let summary = summarize_by_strategy(&records);

        let basic = &summary["v1_basic"];
        assert_eq!(basic.count, 2);
        assert_eq!(basic.avg_lcs_overlap, 0.5);
        assert_eq!(basic.avg_unigram, 0.5);
        assert_eq!(basic.avg_bigram, 0.25);
        assert_eq!(basic.avg_readability, 65.0);
        assert_eq!(basic.avg_processing_time, 1.5);
    }

    #[test]
    fn test_absent_strategies_not_reported() {
        let records = vec![evaluation("v2_role_based", 0.3, 50, 1.0)];
        let summary = summarize_by_strategy(&records);
        assert_eq!(summary.len(), 1);
        assert!(!summary.contains_key("v1_basic"));
        assert!(summarize_by_strategy(&[]).is_empty());
    }

    #[test]
    fn test_order_independent_and_idempotent() {
        let records: Vec<EvaluationRecord> = (0..30)
            .map(|i| {
                let strategy = ["v1_basic", "v3_chain_of_thought", "v5_context_aware"][i % 3];
                evaluation(strategy, 0.1 + (i as f64) * 0.0271, 40 + i as u32, 0.37 * i as f64)
            })
            .collect();

        let first = summarize_by_strategy(&records);
        let second = summarize_by_strategy(&records);
        assert_eq!(first, second);

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(summarize_by_strategy(&reversed), first);

        let mut rotated = records.clone();
        rotated.rotate_left(7);
        assert_eq!(summarize_by_strategy(&rotated), first);
    }

    #[test]
    fn test_missing_scores_count_as_zero() {
        let mut record = evaluation("v4_structured", 0.8, 50, 1.0);
        record.score_set = ScoreSet::unavailable();
        let records = vec![record, evaluation("v4_structured", 0.8, 50, 1.0)];

        let summary = summarize_by_strategy(&records);
        assert_eq!(summary["v4_structured"].avg_lcs_overlap, 0.4);
    }

    #[test]
    fn test_append_is_visible_to_next_summary() {
        let log: MemoryLog<EvaluationRecord> = MemoryLog::new();
        log.append(&evaluation("v1_basic", 0.4, 60, 1.0)).unwrap();
        assert_eq!(summarize_evaluations(&log.read_all().unwrap()).total_evaluations, 1);

        log.append(&evaluation("v1_basic", 0.6, 60, 1.0)).unwrap();
        let summary = summarize_evaluations(&log.read_all().unwrap());
        assert_eq!(summary.total_evaluations, 2);
        assert_eq!(summary.by_strategy["v1_basic"].avg_lcs_overlap, 0.5);
    }

    #[test]
    fn test_usage_summary() {
        let records = vec![
            usage(Tone::Casual, LengthSetting::Short, InputSource::Text),
            usage(Tone::Neutral, LengthSetting::Medium, InputSource::File),
            usage(Tone::Casual, LengthSetting::Medium, InputSource::Text),
        ];
        let summary = summarize_usage(&records);

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_input_chars, 1200);
        assert_eq!(summary.total_output_chars, 300);
        assert_eq!(summary.avg_processing_time, 1.5);
        assert_eq!(summary.avg_compression_ratio, 25.0);
        assert_eq!(summary.text_inputs, 2);
        assert_eq!(summary.file_inputs, 1);
        assert_eq!(
            summary.tone_distribution,
            vec![(Recorded::Known(Tone::Casual), 2), (Recorded::Known(Tone::Neutral), 1)]
        );
        assert_eq!(
            summary.length_distribution,
            vec![
                (Recorded::Known(LengthSetting::Short), 1),
                (Recorded::Known(LengthSetting::Medium), 2),
            ]
        );
    }

    #[test]
    fn test_usage_summary_keeps_unrecognised_styles() {
        let mut formal = usage(Tone::Neutral, LengthSetting::Medium, InputSource::Text);
        formal.tone = Recorded::Unrecognized("Formal".to_string());
        formal.input_source = Recorded::Unrecognized("api".to_string());
        formal.estimated_cost_usd = 0.001;
        let mut casual = usage(Tone::Casual, LengthSetting::Medium, InputSource::Text);
        casual.estimated_cost_usd = 0.001;
        let mut blank = usage(Tone::Casual, LengthSetting::Medium, InputSource::File);
        blank.tone = Recorded::Unrecognized(String::new());
        blank.estimated_cost_usd = 0.0;

        let summary = summarize_usage(&[formal, casual, blank]);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_cost_usd, 0.002);
        assert_eq!(summary.text_inputs, 1);
        assert_eq!(summary.file_inputs, 1);
        assert_eq!(
            summary.tone_distribution,
            vec![
                (Recorded::Unrecognized("Formal".to_string()), 1),
                (Recorded::Known(Tone::Casual), 1),
            ]
        );
        assert_eq!(summary.length_distribution, vec![(Recorded::Known(LengthSetting::Medium), 3)]);
    }

    #[test]
    fn test_usage_summary_ignores_unparsable_cells() {
        let mut broken = usage(Tone::Academic, LengthSetting::Long, InputSource::Text);
        broken.compression_ratio = None;
        broken.processing_time_seconds = None;
        let mut other = usage(Tone::Academic, LengthSetting::Long, InputSource::Text);
        other.compression_ratio = Some(40.0);
        other.processing_time_seconds = Some(3.0);

        let summary = summarize_usage(&[broken, other]);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.avg_compression_ratio, 40.0);
        assert_eq!(summary.avg_processing_time, 3.0);
    }

    #[test]
    fn test_usage_summary_totals_cost() {
        let mut a = usage(Tone::Neutral, LengthSetting::Medium, InputSource::Text);
        a.estimated_cost_usd = 0.0008;
        let mut b = a.clone();
        b.estimated_cost_usd = 0.0021;

        assert_eq!(summarize_usage(&[a, b]).total_cost_usd, 0.0029);
    }

    #[test]
    fn test_empty_usage_log() {
        let summary = summarize_usage(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.avg_processing_time, 0.0);
        assert!(summary.tone_distribution.is_empty());
    }

    #[test]
    fn test_recent_usage() {
        let records: Vec<UsageRecord> = (0..5)
            .map(|i| {
                let mut r = usage(Tone::Neutral, LengthSetting::Medium, InputSource::Text);
                r.input_length = i;
                r
            })
            .collect();

        let recent = recent_usage(&records, 2);
        assert_eq!(recent.iter().map(|r| r.input_length).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(recent_usage(&records, 10).len(), 5);
        assert!(recent_usage(&records, 0).is_empty());
    }
}
