use digest_llm::StrategyKind;
use serde::Serialize;
use std::time::Instant;

/// Counters for one stage run
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageStats {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    /// Summarization strategy used, summarize runs only
    pub strategy: Option<StrategyKind>,
    #[serde(skip)]
    started_at: Option<Instant>,
}

impl StageStats {
    pub fn start() -> Self {
        Self {
            started_at: Some(Instant::now()),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn finish(mut self) -> Self {
        if let Some(started_at) = self.started_at {
            self.elapsed_secs = started_at.elapsed().as_secs_f64();
        }
        self
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    /// Log the end-of-run line for `stage`
    pub fn log(&self, stage: &str) {
        match self.strategy {
            Some(strategy) => tracing::info!(
                "{} complete ({}). Processed: {}, Skipped: {}, Failed: {}, Total time: {:.1}s",
                stage,
                strategy,
                self.processed,
                self.skipped,
                self.failed,
                self.elapsed_secs
            ),
            None => tracing::info!(
                "{} complete. Processed: {}, Skipped: {}, Failed: {}, Total time: {:.1}s",
                stage,
                self.processed,
                self.skipped,
                self.failed,
                self.elapsed_secs
            ),
        }

        if self.failed > 0 {
            tracing::warn!("{} item(s) failed, see warnings above", self.failed);
        }
    }
}
