use async_trait::async_trait;
use serde::Serialize;
use summarybench_common::Result;

/// Generated text and the wall-clock time the service took
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub elapsed_seconds: f64,
}

/// Common trait for text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text from a fully rendered prompt
    async fn generate(&self, prompt: &str) -> Result<Generation>;

    /// Model name, for log lines
    fn model(&self) -> &str;
}
