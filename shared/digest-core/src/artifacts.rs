//! Artifact detection and per-item checkpoint state

use crate::{CoreError, DataLayout, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Pipeline stage of an item, derived purely from which artifacts exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemStage {
    /// No audio artifact yet
    Unseen,

    /// Audio exists (`data/audio/<id>.<ext>`)
    Fetched,

    /// Transcript text exists (`data/transcripts/<id>.txt`)
    Transcribed,

    /// Summary exists (`data/summaries/<id>_summary.txt`)
    Summarized,
}

impl ItemStage {
    pub fn status_string(&self) -> &'static str {
        match self {
            ItemStage::Unseen => "unseen",
            ItemStage::Fetched => "fetched",
            ItemStage::Transcribed => "transcribed",
            ItemStage::Summarized => "summarized",
        }
    }
}

/// Which artifacts of one item are present on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub video_id: String,
    pub audio_path: Option<PathBuf>,
    pub has_transcript_text: bool,
    pub has_transcript_segments: bool,
    pub has_summary: bool,
    pub has_metadata: bool,
}

impl ItemSnapshot {
    /// Most advanced stage whose checkpoint file exists
    pub fn stage(&self) -> ItemStage {
        if self.has_summary {
            ItemStage::Summarized
        } else if self.has_transcript_text {
            ItemStage::Transcribed
        } else if self.audio_path.is_some() {
            ItemStage::Fetched
        } else {
            ItemStage::Unseen
        }
    }

    /// Transcript text exists but its segment file does not
    pub fn segments_missing(&self) -> bool {
        self.has_transcript_text && !self.has_transcript_segments
    }
}

/// Lists artifact files of a directory in deterministic order
#[derive(Debug, Clone)]
pub struct ArtifactScanner {
    extensions: Vec<String>,
}

impl ArtifactScanner {
    /// Scanner accepting the given extensions (without dot, case-insensitive)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check if a path carries one of the accepted extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Matching regular files directly inside `directory`, sorted by file name.
    ///
    /// A directory that does not exist yet yields an empty list.
    pub async fn scan(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.exists() {
            tracing::debug!("Directory does not exist yet: {}", directory.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Item id of an artifact: its file stem with `suffix` stripped
    pub fn item_id(path: &Path, suffix: &str) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let id = stem.strip_suffix(suffix).unwrap_or(stem);
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// First file in `audio_dir` named `<video_id>.<anything>`, in name order
    pub async fn find_by_prefix(audio_dir: &Path, video_id: &str) -> Result<Option<PathBuf>> {
        let prefix = format!("{}.", video_id);
        let mut matches = Vec::new();

        if !audio_dir.exists() {
            return Ok(None);
        }

        for entry in WalkDir::new(audio_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
            let is_match = entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(&prefix))
                .unwrap_or(false);
            if entry.file_type().is_file() && is_match {
                matches.push(entry.into_path());
            }
        }

        matches.sort();
        Ok(matches.into_iter().next())
    }

    /// Artifact snapshot of one item
    pub async fn snapshot(&self, layout: &DataLayout, video_id: &str) -> Result<ItemSnapshot> {
        let mut audio_path = None;
        for ext in &self.extensions {
            let candidate = layout.audio_path(video_id, ext);
            if candidate.exists() {
                audio_path = Some(candidate);
                break;
            }
        }

        Ok(ItemSnapshot {
            video_id: video_id.to_string(),
            audio_path,
            has_transcript_text: layout.transcript_text_path(video_id).exists(),
            has_transcript_segments: layout.transcript_segments_path(video_id).exists(),
            has_summary: layout.summary_path(video_id).exists(),
            has_metadata: layout.metadata_path(video_id).exists(),
        })
    }

    /// Snapshots of every id known to any artifact directory, sorted by id.
    ///
    /// `self` must be configured with the audio extensions.
    pub async fn snapshot_all(&self, layout: &DataLayout) -> Result<Vec<ItemSnapshot>> {
        let mut ids = BTreeSet::new();

        for path in self.scan(layout.audio_dir()).await? {
            ids.extend(Self::item_id(&path, ""));
        }
        for path in ArtifactScanner::new(["txt"]).scan(layout.transcripts_dir()).await? {
            ids.extend(Self::item_id(&path, ""));
        }
        for path in ArtifactScanner::new(["txt"]).scan(layout.summaries_dir()).await? {
            ids.extend(Self::item_id(&path, "_summary"));
        }
        for path in ArtifactScanner::new(["json"]).scan(layout.metadata_dir()).await? {
            ids.extend(Self::item_id(&path, ""));
        }

        let mut snapshots = Vec::with_capacity(ids.len());
        for id in ids {
            snapshots.push(self.snapshot(layout, &id).await?);
        }
        Ok(snapshots)
    }
}
