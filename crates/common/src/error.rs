/// SummaryBench error types
#[derive(Debug, thiserror::Error)]
pub enum SummaryBenchError {
    /// LLM client related error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The text-generation service failed for one prompt
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Strategy id is not registered
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Log persistence error
    #[error("Log error: {0}")]
    Log(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SummaryBenchError {
    /// Create LLM error
    pub fn llm<S: Into<String>>(msg: S) -> Self {
        Self::Llm(msg.into())
    }

    /// Create generation error
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation(msg.into())
    }

    /// Create unknown strategy error
    pub fn unknown_strategy<S: Into<String>>(id: S) -> Self {
        Self::UnknownStrategy(id.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create log error
    pub fn log<S: Into<String>>(msg: S) -> Self {
        Self::Log(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SummaryBenchError::unknown_strategy("v9_magic");
        assert_eq!(err.to_string(), "Unknown strategy: v9_magic");

        let err = SummaryBenchError::generation("timeout");
        assert_eq!(err.to_string(), "Generation failed: timeout");
    }
}
