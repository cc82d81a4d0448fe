//! Digest Core - On-disk layout, metadata records and checkpoint detection

pub mod artifacts;
pub mod layout;
pub mod metadata;
pub mod segment;
pub mod store;

pub use artifacts::{ArtifactScanner, ItemSnapshot, ItemStage};
pub use layout::DataLayout;
pub use metadata::{ItemDescriptor, ItemStatus, MetadataRecord};
pub use segment::{Segment, Transcript};
pub use store::MetadataStore;

/// Result type for Digest Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for Digest Core operations
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Metadata record mismatch: expected {expected}, found {found}")]
    IdMismatch { expected: String, found: String },
}

/// Kind of per-item failure, one per pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorKind {
    Retrieval,
    Transcription,
    Summarization,
}

/// Per-item failure raised inside a stage.
///
/// Stage runners catch these at the item boundary, log them and move on to
/// the next item; anything that is not a `StageError` aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("retrieval failed for {video_id}: {reason}")]
    Retrieval { video_id: String, reason: String },

    #[error("transcription failed for {video_id}: {reason}")]
    Transcription { video_id: String, reason: String },

    #[error("summarization failed for {video_id}: {reason}")]
    Summarization { video_id: String, reason: String },
}

impl StageError {
    pub fn retrieval(video_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Retrieval {
            video_id: video_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn transcription(video_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transcription {
            video_id: video_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn summarization(video_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Summarization {
            video_id: video_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> StageErrorKind {
        match self {
            StageError::Retrieval { .. } => StageErrorKind::Retrieval,
            StageError::Transcription { .. } => StageErrorKind::Transcription,
            StageError::Summarization { .. } => StageErrorKind::Summarization,
        }
    }

    pub fn video_id(&self) -> &str {
        match self {
            StageError::Retrieval { video_id, .. }
            | StageError::Transcription { video_id, .. }
            | StageError::Summarization { video_id, .. } => video_id,
        }
    }
}
