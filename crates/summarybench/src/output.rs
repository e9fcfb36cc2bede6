//! Plain-text rendering for the command line

use std::fmt::{self, Write};
use summarybench_llm::StrategyRegistry;
use summarybench_logs::{format_float, timestamp_cell, EvaluationSummary, UsageAggregate, UsageRecord};
use summarybench_runner::{ComparisonReport, StrategyOutcome};

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "n/a".to_string())
}

fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write(&mut out)?;
    Ok(out)
}

pub fn render_report(report: &ComparisonReport) -> Result<String, fmt::Error> {
    render(|out| {
        if !report.conflicts.is_empty() {
            writeln!(out, "CONFLICT DETECTED")?;
            for conflict in &report.conflicts {
                writeln!(out, "  - {}", conflict)?;
            }
            writeln!(
                out,
                "  This tone and length can't guarantee compliance; results may be sub-optimal.\n"
            )?;
        }

        for outcome in &report.outcomes {
            match outcome {
                StrategyOutcome::Failed { strategy_id, error } => {
                    writeln!(out, "=== {} ===\nFAILED: {}\n", strategy_id, error)?;
                }
                StrategyOutcome::Completed(run) => {
                    writeln!(out, "=== {} ({}) ===", run.name, run.strategy_id)?;
                    writeln!(out, "{}\n", run.summary.trim())?;
                    writeln!(
                        out,
                        "time {:.2}s | length {} | compression {}% | word overlap {}%",
                        run.elapsed_seconds,
                        run.basic.candidate_length,
                        format_float(run.basic.compression_ratio),
                        format_float(run.basic.word_overlap_pct)
                    )?;
                    writeln!(
                        out,
                        "readability {} | avg word length {} | avg sentence length {}",
                        run.readability.readability_score,
                        format_float(run.readability.avg_word_length),
                        format_float(run.readability.avg_sentence_length)
                    )?;
                    if let Some(scores) = &run.scores {
                        writeln!(
                            out,
                            "ROUGE-1 {} | ROUGE-2 {} | ROUGE-L {} | average {}",
                            score(scores.unigram_overlap()),
                            score(scores.bigram_overlap()),
                            score(scores.longest_common_subseq_overlap()),
                            score(scores.average())
                        )?;
                    }
                    for warning in &run.warnings {
                        writeln!(out, "warning: {}", warning)?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    })
}

pub fn render_history(summary: &EvaluationSummary) -> Result<String, fmt::Error> {
    render(|out| {
        if summary.total_evaluations == 0 {
            writeln!(out, "No evaluations recorded yet. Run `compare` with a reference summary.")?;
            return Ok(());
        }

        writeln!(out, "{} evaluations\n", summary.total_evaluations)?;
        writeln!(
            out,
            "{:<22} {:>5} {:>8} {:>8} {:>8} {:>11} {:>9}",
            "strategy", "runs", "ROUGE-1", "ROUGE-2", "ROUGE-L", "readability", "time (s)"
        )?;
        for aggregate in summary.by_strategy.values() {
            writeln!(
                out,
                "{:<22} {:>5} {:>8.3} {:>8.3} {:>8.3} {:>11.1} {:>9.2}",
                aggregate.strategy_id,
                aggregate.count,
                aggregate.avg_unigram,
                aggregate.avg_bigram,
                aggregate.avg_lcs_overlap,
                aggregate.avg_readability,
                aggregate.avg_processing_time
            )?;
        }
        Ok(())
    })
}

pub fn render_usage(summary: &UsageAggregate, recent: &[UsageRecord]) -> Result<String, fmt::Error> {
    render(|out| {
        if summary.total_count == 0 {
            writeln!(out, "No summaries recorded yet.")?;
            return Ok(());
        }

        writeln!(out, "Total summaries:       {}", summary.total_count)?;
        writeln!(out, "  from text / file:    {} / {}", summary.text_inputs, summary.file_inputs)?;
        writeln!(out, "Characters processed:  {}", summary.total_input_chars)?;
        writeln!(out, "Characters generated:  {}", summary.total_output_chars)?;
        writeln!(out, "Avg processing time:   {:.2}s", summary.avg_processing_time)?;
        writeln!(out, "Avg compression ratio: {:.2}%", summary.avg_compression_ratio)?;
        writeln!(out, "Estimated cost:        ${:.4}", summary.total_cost_usd)?;

        writeln!(out, "\nTone distribution:")?;
        for (tone, count) in &summary.tone_distribution {
            writeln!(out, "  {}: {} times", tone, count)?;
        }
        writeln!(out, "Length preferences:")?;
        for (length, count) in &summary.length_distribution {
            writeln!(out, "  {}: {} times", length, count)?;
        }

        if !recent.is_empty() {
            writeln!(out, "\nRecent activity:")?;
            for record in recent.iter().rev() {
                writeln!(
                    out,
                    "  {} | {} {} | reduced {} chars to {} | ${}",
                    Some(timestamp_cell(record.timestamp))
                        .filter(|cell| !cell.is_empty())
                        .unwrap_or_else(|| "unknown time".to_string()),
                    record.tone,
                    record.length_setting,
                    record.input_length,
                    record.output_length,
                    format_float(record.estimated_cost_usd)
                )?;
            }
        }
        Ok(())
    })
}

pub fn render_strategies(registry: &StrategyRegistry) -> Result<String, fmt::Error> {
    render(|out| {
        for strategy in registry.all() {
            writeln!(
                out,
                "{:<22} {:<24} {}",
                strategy.id.as_str(),
                strategy.name,
                strategy.description
            )?;
        }
        Ok(())
    })
}
