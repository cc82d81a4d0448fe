//! LLM and summarization configuration

use serde::{Deserialize, Serialize};

/// LLM provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    LMStudio,
    OpenAI,
}

impl LLMProvider {
    /// Chat-completions URL used when no endpoint is configured
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LLMProvider::LMStudio => "http://localhost:1234/v1/chat/completions",
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    provider: LLMProvider,
    endpoint: Option<String>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::LMStudio,
            endpoint: None,
            api_key: None,
            model: "local-model".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout_seconds: 120,
        }
    }
}

impl LLMConfig {
    /// Create new LLM config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    pub fn with_provider(mut self, provider: LLMProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Configured endpoint, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Configured endpoint or the provider's default
    pub fn resolved_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Summarization settings, shared by both strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Characters per abstractive chunk
    chunk_size: usize,

    /// Lower bound on words per chunk summary
    min_length: u32,

    /// Upper bound on words per chunk summary
    max_length: u32,

    /// Sentences kept by the extractive strategy
    sentence_count: usize,

    /// Trimmed transcripts shorter than this are not summarized
    min_transcript_chars: usize,

    /// When false the run goes straight to the extractive strategy
    enable_abstractive: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            min_length: 150,
            max_length: 400,
            sentence_count: 5,
            min_transcript_chars: 100,
            enable_abstractive: true,
        }
    }
}

impl SummaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn min_length(&self) -> u32 {
        self.min_length
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn with_lengths(mut self, min_length: u32, max_length: u32) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    pub fn with_sentence_count(mut self, sentence_count: usize) -> Self {
        self.sentence_count = sentence_count;
        self
    }

    pub fn min_transcript_chars(&self) -> usize {
        self.min_transcript_chars
    }

    pub fn with_min_transcript_chars(mut self, min_transcript_chars: usize) -> Self {
        self.min_transcript_chars = min_transcript_chars;
        self
    }

    pub fn enable_abstractive(&self) -> bool {
        self.enable_abstractive
    }

    pub fn with_abstractive(mut self, enabled: bool) -> Self {
        self.enable_abstractive = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_endpoint() {
        let config = LLMConfig::default();
        assert_eq!(config.resolved_endpoint(), "http://localhost:1234/v1/chat/completions");

        let config = config.with_provider(LLMProvider::OpenAI);
        assert_eq!(config.resolved_endpoint(), "https://api.openai.com/v1/chat/completions");

        let config = config.with_endpoint(Some("http://proxy/v1/chat/completions".to_string()));
        assert_eq!(config.resolved_endpoint(), "http://proxy/v1/chat/completions");
    }

    #[test]
    fn test_summary_defaults() {
        let config = SummaryConfig::default();
        assert_eq!(config.chunk_size(), 5000);
        assert_eq!(config.min_length(), 150);
        assert_eq!(config.max_length(), 400);
        assert_eq!(config.sentence_count(), 5);
        assert_eq!(config.min_transcript_chars(), 100);
        assert!(config.enable_abstractive());
    }
}
