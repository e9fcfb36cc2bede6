use crate::error::SummaryBenchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SummaryBench application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directory for persisted logs
    pub data_dir: PathBuf,

    /// Evaluation log (one row per strategy run with a reference)
    pub evaluation_log_path: PathBuf,

    /// Usage log (one row per generation)
    pub usage_log_path: PathBuf,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Generation model name
    pub llm_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate per summary
    pub max_tokens: u32,

    /// Upper bound on the LCS table (reference tokens x candidate tokens)
    pub lcs_cell_limit: usize,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("./data");
        Self {
            evaluation_log_path: data_dir.join("prompt_evaluations.csv"),
            usage_log_path: data_dir.join("summaries_metrics.csv"),
            log_dir: data_dir.join("log"),
            data_dir,
            ollama_base_url: "http://localhost:11434".to_string(),
            llm_model: "llama3.2:latest".to_string(),
            temperature: 0.5,
            max_tokens: 700,
            lcs_cell_limit: 25_000_000,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SummaryBenchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let data_dir = Self::get_env_path("DATA_DIR").unwrap_or(defaults.data_dir);

        let config = Self {
            evaluation_log_path: Self::get_env_path("EVALUATION_LOG")
                .unwrap_or_else(|| data_dir.join("prompt_evaluations.csv")),
            usage_log_path: Self::get_env_path("USAGE_LOG")
                .unwrap_or_else(|| data_dir.join("summaries_metrics.csv")),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or_else(|| data_dir.join("log")),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            llm_model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            temperature: Self::get_env_parsed("LLM_TEMPERATURE").unwrap_or(defaults.temperature),
            max_tokens: Self::get_env_parsed("LLM_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            lcs_cell_limit: Self::get_env_parsed("LCS_CELL_LIMIT")
                .unwrap_or(defaults.lcs_cell_limit),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            data_dir,
        };

        config.validate()?;

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), SummaryBenchError> {
        let mut dirs = vec![self.data_dir.clone(), self.log_dir.clone()];
        for log in [&self.evaluation_log_path, &self.usage_log_path] {
            if let Some(parent) = log.parent().filter(|p| !p.as_os_str().is_empty()) {
                dirs.push(parent.to_path_buf());
            }
        }

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    SummaryBenchError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SummaryBenchError> {
        if self.llm_model.trim().is_empty() {
            return Err(SummaryBenchError::config("LLM model name cannot be empty"));
        }

        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(SummaryBenchError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SummaryBenchError::config(format!(
                "Temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(SummaryBenchError::config("max_tokens cannot be 0"));
        }

        if self.lcs_cell_limit == 0 {
            return Err(SummaryBenchError::config("lcs_cell_limit cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_tokens, 700);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(
            config.evaluation_log_path,
            PathBuf::from("./data/prompt_evaluations.csv")
        );
        assert_eq!(config.usage_log_path, PathBuf::from("./data/summaries_metrics.csv"));
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.llm_model = String::new();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.ollama_base_url = "localhost:11434".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.temperature = 3.5;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.lcs_cell_limit = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_ensure_directories_creates_log_parents() {
        let dir = std::env::temp_dir().join(format!("summarybench-cfg-{}", std::process::id()));
        let config = AppConfig {
            data_dir: dir.join("data"),
            evaluation_log_path: dir.join("logs/eval.csv"),
            usage_log_path: dir.join("logs/usage.csv"),
            log_dir: dir.join("log"),
            ..AppConfig::default()
        };

        config.ensure_directories().unwrap();
        assert!(dir.join("data").is_dir());
        assert!(dir.join("logs").is_dir());
        assert!(dir.join("log").is_dir());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
