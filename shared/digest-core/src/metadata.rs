//! Per-item metadata records shared by all three stages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Descriptor of one resolved item, extracted before anything is downloaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Stable item identifier, used as the stem of every artifact
    pub id: String,

    pub title: Option<String>,

    /// Canonical page URL of the item
    pub webpage_url: Option<String>,

    /// Duration in seconds
    pub duration: Option<f64>,
}

impl ItemDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            webpage_url: None,
            duration: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_webpage_url(mut self, url: impl Into<String>) -> Self {
        self.webpage_url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

/// Last known pipeline status of an item, persisted in its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Fetched,
    Transcribed,
    Summarized,
    /// Retrieval ran but produced no locatable audio file
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Fetched => "fetched",
            ItemStatus::Transcribed => "transcribed",
            ItemStatus::Summarized => "summarized",
            ItemStatus::Failed => "failed",
        }
    }
}

/// One JSON record per item.
///
/// Keys this type does not model are kept in `extra` so that a
/// read-modify-write round trip never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub video_id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub webpage_url: Option<String>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// `null` when retrieval ran but no audio file could be located
    #[serde(default)]
    pub audio_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<PathBuf>,

    #[serde(default)]
    pub status: ItemStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataRecord {
    /// Build the record the fetcher writes after a retrieval attempt
    pub fn fetched(descriptor: &ItemDescriptor, audio_path: Option<PathBuf>) -> Self {
        let status = if audio_path.is_some() {
            ItemStatus::Fetched
        } else {
            ItemStatus::Failed
        };

        Self {
            video_id: descriptor.id.clone(),
            title: descriptor.title.clone(),
            webpage_url: descriptor.webpage_url.clone(),
            duration: descriptor.duration,
            audio_path,
            transcript_path: None,
            summary_path: None,
            status,
            updated_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }

    /// Record a finished transcription
    pub fn mark_transcribed(&mut self, transcript_path: &Path) {
        self.transcript_path = Some(transcript_path.to_path_buf());
        self.status = ItemStatus::Transcribed;
        self.touch();
    }

    /// Record a finished summary
    pub fn mark_summarized(&mut self, summary_path: &Path) {
        self.summary_path = Some(summary_path.to_path_buf());
        self.status = ItemStatus::Summarized;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Display title, falling back to the id
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.video_id)
    }
}
