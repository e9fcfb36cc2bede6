//! SummaryBench LLM Integration
//!
//! Summarization strategies, style instructions and the Ollama generation client

mod client;
mod llm_trait;
mod prompts;
mod types;

pub use client::OllamaClient;
pub use llm_trait::{Generation, TextGenerator};
pub use prompts::{
    detect_conflicts, length_directive, style_instruction, tone_directive, ConflictKind,
    Strategy, StrategyId, StrategyRegistry, StyleConflict, DEFAULT_STRATEGIES,
};
pub use types::{GenerateOptions, GenerateRequest, GenerateResponse};
