//! Directory layout of the pipeline's data tree

use crate::Result;
use std::path::{Path, PathBuf};

/// Paths of every artifact directory, all rooted at `<base>/data`.
///
/// Nothing is created on construction; call [`DataLayout::ensure_dirs`] once
/// before a stage starts writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    base_dir: PathBuf,
    audio_dir: PathBuf,
    transcripts_dir: PathBuf,
    summaries_dir: PathBuf,
    metadata_dir: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let data_dir = base_dir.join("data");

        Self {
            audio_dir: data_dir.join("audio"),
            transcripts_dir: data_dir.join("transcripts"),
            summaries_dir: data_dir.join("summaries"),
            metadata_dir: data_dir.join("metadata"),
            base_dir,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn transcripts_dir(&self) -> &Path {
        &self.transcripts_dir
    }

    pub fn summaries_dir(&self) -> &Path {
        &self.summaries_dir
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// Create all artifact directories (idempotent)
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.audio_dir,
            &self.transcripts_dir,
            &self.summaries_dir,
            &self.metadata_dir,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        tracing::debug!("Data directories ready under {}", self.base_dir.display());
        Ok(())
    }

    /// `data/audio/<id>.<ext>`
    pub fn audio_path(&self, video_id: &str, extension: &str) -> PathBuf {
        self.audio_dir.join(format!("{}.{}", video_id, extension))
    }

    /// `data/transcripts/<id>.txt`
    pub fn transcript_text_path(&self, video_id: &str) -> PathBuf {
        self.transcripts_dir.join(format!("{}.txt", video_id))
    }

    /// `data/transcripts/<id>.json`
    pub fn transcript_segments_path(&self, video_id: &str) -> PathBuf {
        self.transcripts_dir.join(format!("{}.json", video_id))
    }

    /// `data/summaries/<id>_summary.txt`
    pub fn summary_path(&self, video_id: &str) -> PathBuf {
        self.summaries_dir.join(format!("{}_summary.txt", video_id))
    }

    /// `data/metadata/<id>.json`
    pub fn metadata_path(&self, video_id: &str) -> PathBuf {
        self.metadata_dir.join(format!("{}.json", video_id))
    }
}
