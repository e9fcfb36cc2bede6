use std::sync::Arc;
use summarybench_common::{AppConfig, Result};
use summarybench_llm::{StrategyRegistry, TextGenerator};
use summarybench_logs::{
    summarize_evaluations, summarize_usage, CsvLog, EvaluationRecord, EvaluationSummary,
    LogStore, UsageAggregate, UsageRecord,
};
use summarybench_metrics::OverlapScorer;
use tracing::info;

use crate::workflow::ComparisonRunner;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Per-strategy evaluation log
    pub evaluations: Arc<dyn LogStore<EvaluationRecord>>,

    /// Per-run usage log
    pub usage: Arc<dyn LogStore<UsageRecord>>,

    pub registry: StrategyRegistry,
}

impl AppState {
    /// Create application state backed by the CSV logs named in `config`
    pub fn new(config: AppConfig) -> Result<Self> {
        config.ensure_directories()?;

        let evaluations = Arc::new(CsvLog::<EvaluationRecord>::new(&config.evaluation_log_path));
        let usage = Arc::new(CsvLog::<UsageRecord>::new(&config.usage_log_path));

        info!(
            "Logs: evaluations={}, usage={}",
            config.evaluation_log_path.display(),
            config.usage_log_path.display()
        );

        Ok(Self::with_stores(config, evaluations, usage))
    }

    /// Create application state over explicit stores
    pub fn with_stores(
        config: AppConfig,
        evaluations: Arc<dyn LogStore<EvaluationRecord>>,
        usage: Arc<dyn LogStore<UsageRecord>>,
    ) -> Self {
        Self {
            config,
            evaluations,
            usage,
            registry: StrategyRegistry::new(),
        }
    }

    /// Comparison runner sharing this state's logs
    pub fn runner(&self, generator: Arc<dyn TextGenerator>) -> ComparisonRunner {
        ComparisonRunner::new(
            generator,
            self.registry.clone(),
            OverlapScorer::with_lcs_cell_limit(self.config.lcs_cell_limit),
            Arc::clone(&self.evaluations),
            Arc::clone(&self.usage),
        )
    }

    pub fn evaluation_summary(&self) -> Result<EvaluationSummary> {
        Ok(summarize_evaluations(&self.evaluations.read_all()?))
    }

    /// Every readable usage record, oldest first
    pub fn usage_records(&self) -> Result<Vec<UsageRecord>> {
        self.usage.read_all()
    }

    pub fn usage_summary(&self) -> Result<UsageAggregate> {
        Ok(summarize_usage(&self.usage_records()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summarybench_logs::MemoryLog;

    #[test]
    fn test_new_creates_data_dir_and_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let config = AppConfig {
            evaluation_log_path: data_dir.join("prompt_evaluations.csv"),
            usage_log_path: data_dir.join("summaries_metrics.csv"),
            log_dir: data_dir.join("log"),
            data_dir: data_dir.clone(),
            ..AppConfig::default()
        };

        let state = AppState::new(config).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(state.evaluation_summary().unwrap().total_evaluations, 0);
        assert_eq!(state.usage_summary().unwrap().total_count, 0);
    }

    #[test]
    fn test_with_stores_reads_injected_logs() {
        let usage = Arc::new(MemoryLog::<UsageRecord>::new());
        usage
            .push_raw(&[
                "2024-05-01 09:30:00", "400", "100", "25.0", "Neutral", "Medium", "text", "N/A",
                "0.0001", "1.5",
            ])
            .unwrap();

        let state = AppState::with_stores(
            AppConfig::default(),
            Arc::new(MemoryLog::<EvaluationRecord>::new()),
            usage,
        );
        let summary = state.usage_summary().unwrap();
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.total_cost_usd, 0.0001);
    }
}
