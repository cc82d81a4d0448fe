//! Digest Media - Audio retrieval and speech recognition collaborators

pub mod audio;
pub mod config;
pub mod fetcher;
mod process;
pub mod whisper;

pub use audio::locate_audio;
pub use config::{FetchConfig, TranscriptionConfig};
pub use fetcher::{parse_resolution, MediaSource, YtDlpSource};
pub use whisper::{SpeechRecognizer, WhisperTranscriber};

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Error types for media operations
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] digest_core::CoreError),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Whisper error: {0}")]
    Whisper(String),

    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}
