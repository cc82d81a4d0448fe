use anyhow::{Context, Result};
use digest_core::{ArtifactScanner, DataLayout, MetadataStore, StageError};
use digest_llm::SummaryStrategy;
use std::path::Path;
use tracing::{debug, info, warn};

use super::StageStats;

/// Summarizes every transcript that has no summary yet, with one strategy per run
pub struct SummarizeStage {
    strategy: SummaryStrategy,
    layout: DataLayout,
    store: MetadataStore,
    min_transcript_chars: usize,
}

impl SummarizeStage {
    pub fn new(strategy: SummaryStrategy, layout: DataLayout, min_transcript_chars: usize) -> Self {
        let store = MetadataStore::new(layout.metadata_dir());
        Self {
            strategy,
            layout,
            store,
            min_transcript_chars,
        }
    }

    pub async fn run(&self) -> Result<StageStats> {
        self.layout
            .ensure_dirs()
            .await
            .context("Failed to create data directories")?;

        let transcripts = ArtifactScanner::new(["txt"])
            .scan(self.layout.transcripts_dir())
            .await
            .context("Failed to list transcripts")?;
        info!(
            "Found {} transcript(s), summarizing {}",
            transcripts.len(),
            self.strategy.kind()
        );

        let mut stats = StageStats::start().with_strategy(self.strategy.kind());

        for transcript_path in &transcripts {
            let Some(video_id) = ArtifactScanner::item_id(transcript_path, "") else {
                continue;
            };

            if self.layout.summary_path(&video_id).exists() {
                debug!("Skipping {}: already summarized", video_id);
                stats.skipped += 1;
                continue;
            }

            match self.summarize_item(&video_id, transcript_path).await {
                Ok(true) => stats.processed += 1,
                Ok(false) => stats.skipped += 1,
                Err(e) => {
                    warn!("{}", e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats.finish())
    }

    /// `Ok(false)` when the transcript is too short to summarize
    async fn summarize_item(
        &self,
        video_id: &str,
        transcript_path: &Path,
    ) -> std::result::Result<bool, StageError> {
        let raw = tokio::fs::read_to_string(transcript_path)
            .await
            .map_err(|e| StageError::summarization(video_id, e))?;
        let text = raw.trim();

        let length = text.chars().count();
        if length < self.min_transcript_chars {
            debug!(
                "Skipping {}: transcript has {} characters, minimum is {}",
                video_id, length, self.min_transcript_chars
            );
            return Ok(false);
        }

        info!("Summarizing {}", video_id);
        let summary = self
            .strategy
            .summarize(text)
            .await
            .map_err(|e| StageError::summarization(video_id, e))?;

        let summary_path = self.layout.summary_path(video_id);
        tokio::fs::write(&summary_path, &summary)
            .await
            .map_err(|e| StageError::summarization(video_id, e))?;

        self.store
            .update(video_id, |record| record.mark_summarized(&summary_path))
            .await
            .map_err(|e| StageError::summarization(video_id, e))?;

        Ok(true)
    }
}
