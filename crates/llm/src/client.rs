use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use summarybench_common::{AppConfig, Result, SummaryBenchError};
use tracing::{debug, info, warn};

use crate::llm_trait::{Generation, TextGenerator};
use crate::types::{GenerateOptions, GenerateRequest, GenerateResponse};

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    options: GenerateOptions,
    max_retries: u32,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client for one model
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minutes for LLM calls
            .build()
            .map_err(|e| SummaryBenchError::llm(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {} ({})", base_url, model);
        Ok(Self {
            base_url,
            model,
            options: GenerateOptions::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            client,
        })
    }

    /// Client with model, temperature and token limit taken from config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(&config.ollama_base_url, &config.llm_model)?
            .with_sampling(config.temperature, config.max_tokens))
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.options.temperature = Some(temperature);
        self.options.num_predict = Some(max_tokens);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_for(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: Some(false),
            options: Some(self.options.clone()),
        }
    }

    /// Generate text with retry and exponential backoff
    async fn generate_with_retry(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        debug!(
            "Sending generate request to Ollama - Model: {}, Prompt length: {}",
            request.model,
            request.prompt.len()
        );

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.try_generate(&url, request).await {
                Ok(response) => {
                    debug!("Received response from Ollama - Length: {}", response.len());
                    return Ok(response);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt - 1));
                        warn!(
                            "Ollama request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt, self.max_retries, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(SummaryBenchError::generation(match last_error {
            Some(e) => format!("all {} attempts failed: {}", self.max_retries, e),
            None => "all retries failed".to_string(),
        }))
    }

    /// Single attempt to generate text
    async fn try_generate(&self, url: &str, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| SummaryBenchError::llm(format!("Failed to send request: {}", e)))?
            .error_for_status()
            .map_err(|e| SummaryBenchError::llm(format!("Ollama API error: {}", e)))?;

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummaryBenchError::llm(format!("Failed to parse response: {}", e)))?;

        if result.response.trim().is_empty() {
            return Err(SummaryBenchError::llm("Empty response from Ollama"));
        }

        Ok(result.response)
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SummaryBenchError::llm(format!("Failed to connect to Ollama: {}", e)))?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = self.request_for(prompt);
        let start = Instant::now();
        let text = self.generate_with_retry(&request).await?;

        Ok(Generation {
            text,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
