//! Retrieval and transcription configuration

use serde::{Deserialize, Serialize};

/// Settings for the yt-dlp retrieval collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// yt-dlp executable
    binary: String,

    /// yt-dlp format selector
    format: String,

    /// Codec the audio is converted to after download
    audio_format: String,

    /// Audio quality passed to the extractor (kbps)
    audio_quality: String,

    /// Per-call timeout in seconds (0 disables it)
    timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "bestaudio/best".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192".to_string(),
            timeout_seconds: 3600,
        }
    }
}

impl FetchConfig {
    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn with_binary(mut self, binary: String) -> Self {
        self.binary = binary;
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Extension the fetcher expects the audio file to carry
    pub fn audio_format(&self) -> &str {
        &self.audio_format
    }

    pub fn with_audio_format(mut self, audio_format: String) -> Self {
        self.audio_format = audio_format;
        self
    }

    pub fn audio_quality(&self) -> &str {
        &self.audio_quality
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Settings for the Whisper speech-recognition collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper model: "tiny", "base", "small", "medium", "large-v3"
    model: String,

    /// Directory holding ggml model files for whisper.cpp
    model_dir: String,

    /// Target language (None for auto-detect)
    language: Option<String>,

    /// Use GPU acceleration when the backend supports it
    use_gpu: bool,

    beam_size: u32,

    threads: u32,

    /// Per-file timeout in seconds (0 disables it)
    timeout_seconds: u64,

    /// Extensions treated as audio artifacts
    audio_extensions: Vec<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            model_dir: "models".to_string(),
            language: None,
            use_gpu: true,
            beam_size: 5,
            threads: 4,
            timeout_seconds: 3600,
            audio_extensions: ["mp3", "m4a", "webm", "opus", "ogg", "wav", "aac", "flac"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl TranscriptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model_dir(&self) -> &str {
        &self.model_dir
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn use_gpu(&self) -> bool {
        self.use_gpu
    }

    pub fn with_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }

    pub fn beam_size(&self) -> u32 {
        self.beam_size
    }

    pub fn threads(&self) -> u32 {
        self.threads
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn audio_extensions(&self) -> &[String] {
        &self.audio_extensions
    }

    pub fn with_audio_extensions(mut self, extensions: Vec<String>) -> Self {
        self.audio_extensions = extensions;
        self
    }
}
