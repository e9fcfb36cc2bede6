use indicatif::ProgressBar;
use serde::Serialize;
use std::sync::Arc;
use summarybench_common::{InputSource, LengthSetting, Result, Tone};
use summarybench_llm::{
    detect_conflicts, style_instruction, StrategyId, StrategyRegistry, StyleConflict,
    TextGenerator,
};
use summarybench_logs::{EvaluationRecord, LogStore, UsageRecord};
use summarybench_metrics::{
    basic_metrics, readability, BasicMetrics, OverlapScorer, ReadabilityMetrics, ScoreSet,
};
use tracing::{debug, info, warn};

/// One input to summarize with several strategies
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub text: String,
    /// Strategy ids in run order; unknown ids fail individually
    pub strategies: Vec<String>,
    pub tone: Tone,
    pub length: LengthSetting,
    pub input_source: InputSource,
    pub file_type: Option<String>,
    /// Reference summary for overlap scoring
    pub reference: Option<String>,
}

impl ComparisonRequest {
    pub fn new(text: impl Into<String>, strategies: Vec<String>) -> Self {
        Self {
            text: text.into(),
            strategies,
            tone: Tone::default(),
            length: LengthSetting::default(),
            input_source: InputSource::default(),
            file_type: None,
            reference: None,
        }
    }

    fn reference_text(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .filter(|reference| !reference.trim().is_empty())
    }
}

/// A strategy that produced a summary
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRun {
    pub strategy_id: String,
    pub name: String,
    pub summary: String,
    pub elapsed_seconds: f64,
    pub basic: BasicMetrics,
    pub readability: ReadabilityMetrics,
    /// `None` when no reference was supplied
    pub scores: Option<ScoreSet>,
    /// Non-fatal problems (scorer fallback, log append failures)
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Completed(StrategyRun),
    Failed { strategy_id: String, error: String },
}

impl StrategyOutcome {
    pub fn strategy_id(&self) -> &str {
        match self {
            StrategyOutcome::Completed(run) => &run.strategy_id,
            StrategyOutcome::Failed { strategy_id, .. } => strategy_id,
        }
    }
}

/// Per-strategy outcomes in request order
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub outcomes: Vec<StrategyOutcome>,
    pub conflicts: Vec<StyleConflict>,
}

impl ComparisonReport {
    pub fn completed(&self) -> impl Iterator<Item = &StrategyRun> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            StrategyOutcome::Completed(run) => Some(run),
            StrategyOutcome::Failed { .. } => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.completed().count()
    }
}

/// Runs every requested strategy over one input and logs the results
pub struct ComparisonRunner {
    generator: Arc<dyn TextGenerator>,
    registry: StrategyRegistry,
    scorer: OverlapScorer,
    evaluations: Arc<dyn LogStore<EvaluationRecord>>,
    usage: Arc<dyn LogStore<UsageRecord>>,
    progress: Option<ProgressBar>,
}

impl ComparisonRunner {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        registry: StrategyRegistry,
        scorer: OverlapScorer,
        evaluations: Arc<dyn LogStore<EvaluationRecord>>,
        usage: Arc<dyn LogStore<UsageRecord>>,
    ) -> Self {
        Self {
            generator,
            registry,
            scorer,
            evaluations,
            usage,
            progress: None,
        }
    }

    /// Tick `progress` once per strategy
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the comparison
    ///
    /// Failures stay with the strategy that hit them; the batch always
    /// runs to the end.
    pub async fn run(&self, request: &ComparisonRequest) -> ComparisonReport {
        let known: Vec<StrategyId> = request
            .strategies
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect();
        let conflicts = detect_conflicts(&known, request.tone, request.length);
        for conflict in &conflicts {
            warn!("Style conflict: {}", conflict);
        }

        info!(
            "Comparing {} strategies on {} chars (tone: {}, length: {}, reference: {})",
            request.strategies.len(),
            request.text.chars().count(),
            request.tone,
            request.length,
            request.reference_text().is_some()
        );

        if let Some(pb) = &self.progress {
            pb.set_length(request.strategies.len() as u64);
        }

        let style = style_instruction(request.tone, request.length);
        let mut outcomes = Vec::with_capacity(request.strategies.len());

        for strategy_id in &request.strategies {
            if let Some(pb) = &self.progress {
                pb.set_message(format!("Testing {}", self.registry.display_name(strategy_id)));
            }

            let outcome = match self.run_strategy(request, strategy_id, &style).await {
                Ok(run) => StrategyOutcome::Completed(run),
                Err(e) => {
                    warn!("Strategy {} failed: {}", strategy_id, e);
                    StrategyOutcome::Failed {
                        strategy_id: strategy_id.clone(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message("Summarization complete");
        }

        let report = ComparisonReport { outcomes, conflicts };
        info!(
            "Comparison finished: {} completed, {} failed",
            report.completed().count(),
            report.failed_count()
        );
        report
    }

    async fn run_strategy(
        &self,
        request: &ComparisonRequest,
        strategy_id: &str,
        style: &str,
    ) -> Result<StrategyRun> {
        let strategy = self.registry.get(strategy_id)?;
        let strategy_id = strategy.id.as_str();
        let prompt = format!("{}{}", strategy.render(&request.text), style);

        debug!(
            "Generating with {} via {} (prompt: {} chars)",
            strategy_id,
            self.generator.model(),
            prompt.len()
        );
        let generation = self.generator.generate(&prompt).await?;

        let basic = basic_metrics(&request.text, &generation.text);
        let readability = readability(&generation.text);
        let mut warnings = Vec::new();

        let scores = request.reference_text().map(|reference| {
            let (scores, failure) = self.scorer.score_lenient(reference, &generation.text);
            if let Some(e) = failure {
                warnings.push(format!("overlap scores unavailable: {}", e));
            }
            scores
        });

        let usage = UsageRecord::new(
            basic.reference_length,
            basic.candidate_length,
            basic.compression_ratio,
            request.tone,
            request.length,
            request.input_source,
            request.file_type.clone(),
            generation.elapsed_seconds,
        );
        if let Err(e) = self.usage.append(&usage) {
            warn!("Failed to append usage record for {}: {}", strategy_id, e);
            warnings.push(format!("usage log not updated: {}", e));
        }

        if let Some(scores) = scores {
            let evaluation = EvaluationRecord::new(
                strategy_id,
                basic.reference_length,
                scores,
                &basic,
                &readability,
                generation.elapsed_seconds,
            );
            if let Err(e) = self.evaluations.append(&evaluation) {
                warn!("Failed to append evaluation record for {}: {}", strategy_id, e);
                warnings.push(format!("evaluation log not updated: {}", e));
            }
        }

        info!(
            "{} done in {:.2}s ({} chars, readability {})",
            strategy_id, generation.elapsed_seconds, basic.candidate_length, readability.readability_score
        );

        Ok(StrategyRun {
            strategy_id: strategy_id.to_string(),
            name: strategy.name.to_string(),
            summary: generation.text,
            elapsed_seconds: generation.elapsed_seconds,
            basic,
            readability,
            scores,
            warnings,
        })
    }
}
