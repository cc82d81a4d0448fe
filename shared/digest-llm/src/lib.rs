//! Digest LLM - Transcript summarization, abstractive via an LLM or extractive via LexRank

pub mod abstractive;
pub mod config;
pub mod extractive;
pub mod providers;
pub mod strategy;

pub use abstractive::{split_chunks, AbstractiveSummarizer};
pub use config::{LLMConfig, LLMProvider, SummaryConfig};
pub use extractive::ExtractiveSummarizer;
pub use providers::{create_llm, ChatMessage, LLMResponse, LLM};
pub use strategy::{StrategyKind, Summarizer, SummaryStrategy};

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Error types for LLM operations
#[derive(thiserror::Error, Debug)]
pub enum LLMError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Provider not available: {0:?}")]
    ProviderUnavailable(LLMProvider),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM response error: {0}")]
    ResponseError(String),
}
