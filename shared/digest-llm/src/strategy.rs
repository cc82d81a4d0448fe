//! Run-wide choice between abstractive and extractive summarization

use crate::{AbstractiveSummarizer, ExtractiveSummarizer, LLMConfig, Result, SummaryConfig};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Which summarizer a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Abstractive,
    Extractive,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Abstractive => write!(f, "abstractive"),
            StrategyKind::Extractive => write!(f, "extractive"),
        }
    }
}

/// Produces one summary per transcript text
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
    fn kind(&self) -> StrategyKind;
}

#[async_trait]
impl Summarizer for AbstractiveSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.summarize_text(text).await
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Abstractive
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        Ok(self.summarize_text(text))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Extractive
    }
}

/// The summarizer fixed for a whole run
pub struct SummaryStrategy {
    summarizer: Box<dyn Summarizer>,
}

impl SummaryStrategy {
    pub fn new(summarizer: Box<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// Try the configured LLM once and fall back to LexRank if it cannot be
    /// brought up. The result holds for every item of the run.
    pub async fn select(llm_config: &LLMConfig, config: &SummaryConfig) -> Result<Self> {
        if !config.enable_abstractive() {
            info!("Abstractive summarization disabled, using extractive");
            return Self::extractive(config);
        }

        let attempt = AbstractiveSummarizer::initialize(llm_config, config).await;
        Self::choose(attempt, config)
    }

    /// Keep the abstractive summarizer if it initialized, otherwise go extractive
    pub fn choose(attempt: Result<AbstractiveSummarizer>, config: &SummaryConfig) -> Result<Self> {
        match attempt {
            Ok(abstractive) => Ok(Self::new(Box::new(abstractive))),
            Err(e) => {
                warn!("Falling back to extractive summarization due to: {}", e);
                Self::extractive(config)
            }
        }
    }

    pub fn extractive(config: &SummaryConfig) -> Result<Self> {
        let extractive = ExtractiveSummarizer::new(config.sentence_count())?;
        Ok(Self::new(Box::new(extractive)))
    }

    pub fn kind(&self) -> StrategyKind {
        self.summarizer.kind()
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        self.summarizer.summarize(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LLMError;

    #[test]
    fn test_failed_initialization_falls_back() {
        let config = SummaryConfig::default();
        let attempt = Err(LLMError::Configuration("no endpoint".to_string()));
        let strategy = SummaryStrategy::choose(attempt, &config).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Extractive);
    }

    #[tokio::test]
    async fn test_disabled_abstractive_selects_extractive() {
        let config = SummaryConfig::default().with_abstractive(false);
        let strategy = SummaryStrategy::select(&LLMConfig::default(), &config)
            .await
            .unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Extractive);
        assert_eq!(strategy.kind().to_string(), "extractive");
    }
}
