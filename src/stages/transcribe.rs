use anyhow::{Context, Result};
use digest_core::{ArtifactScanner, DataLayout, MetadataStore, StageError, Transcript};
use digest_media::SpeechRecognizer;
use std::path::Path;
use tracing::{debug, info, warn};

use super::StageStats;

/// Transcribes every audio artifact that has no transcript text yet
pub struct TranscribeStage<R: SpeechRecognizer> {
    recognizer: R,
    layout: DataLayout,
    store: MetadataStore,
    scanner: ArtifactScanner,
}

impl<R: SpeechRecognizer> TranscribeStage<R> {
    pub fn new<I, S>(recognizer: R, layout: DataLayout, audio_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = MetadataStore::new(layout.metadata_dir());
        Self {
            recognizer,
            layout,
            store,
            scanner: ArtifactScanner::new(audio_extensions),
        }
    }

    pub async fn run(&self) -> Result<StageStats> {
        self.layout
            .ensure_dirs()
            .await
            .context("Failed to create data directories")?;

        let audio_files = self
            .scanner
            .scan(self.layout.audio_dir())
            .await
            .context("Failed to list audio files")?;
        info!("Found {} audio file(s)", audio_files.len());

        let mut stats = StageStats::start();

        for audio_path in &audio_files {
            let Some(video_id) = ArtifactScanner::item_id(audio_path, "") else {
                continue;
            };

            let text_path = self.layout.transcript_text_path(&video_id);
            if text_path.exists() {
                // Text alone is the checkpoint, even without segments
                if !self.layout.transcript_segments_path(&video_id).exists() {
                    warn!(
                        "Transcript for {} has no segment file; delete {} to redo it",
                        video_id,
                        text_path.display()
                    );
                }
                debug!("Skipping {}: already transcribed", video_id);
                stats.skipped += 1;
                continue;
            }

            match self.transcribe_item(&video_id, audio_path).await {
                Ok(()) => stats.processed += 1,
                Err(e) => {
                    warn!("{} ({})", e, file_name(audio_path));
                    stats.failed += 1;
                }
            }
        }

        Ok(stats.finish())
    }

    async fn transcribe_item(
        &self,
        video_id: &str,
        audio_path: &Path,
    ) -> std::result::Result<(), StageError> {
        info!("Transcribing {}", file_name(audio_path));
        let segments = self
            .recognizer
            .transcribe(audio_path)
            .await
            .map_err(|e| StageError::transcription(video_id, e))?;
        let transcript = Transcript::from_segments(segments);

        let text_path = self.layout.transcript_text_path(video_id);
        let segments_path = self.layout.transcript_segments_path(video_id);
        let segments_json = serde_json::to_string_pretty(&transcript.segments)
            .map_err(|e| StageError::transcription(video_id, e))?;

        tokio::fs::write(&text_path, &transcript.text)
            .await
            .map_err(|e| StageError::transcription(video_id, e))?;
        tokio::fs::write(&segments_path, segments_json)
            .await
            .map_err(|e| StageError::transcription(video_id, e))?;

        self.store
            .update(video_id, |record| record.mark_transcribed(&text_path))
            .await
            .map_err(|e| StageError::transcription(video_id, e))?;

        info!(
            "Transcribed {}: {} segments, {} characters",
            video_id,
            transcript.segments.len(),
            transcript.text.chars().count()
        );
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
