//! Speech recognition through a local Whisper backend

use async_trait::async_trait;
use digest_core::Segment;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::TranscriptionConfig;
use crate::process::{command_available, failure_reason, run_with_timeout};
use crate::{MediaError, Result};

/// Converts an audio file into timed text segments
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>>;
}

/// Installed Whisper flavours, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    WhisperCli,
    WhisperCpp,
    Python,
}

impl Backend {
    const ALL: [Backend; 3] = [Backend::WhisperCli, Backend::WhisperCpp, Backend::Python];

    fn command(&self) -> &'static str {
        match self {
            Backend::WhisperCli => "whisper-cli",
            Backend::WhisperCpp => "whisper-cpp",
            Backend::Python => "whisper",
        }
    }
}

/// Whisper transcriber with automatic backend detection
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    async fn detect_backend() -> Result<Backend> {
        for backend in Backend::ALL {
            if command_available(backend.command()).await {
                debug!("Using {} backend", backend.command());
                return Ok(backend);
            }
            debug!("{} not available", backend.command());
        }

        Err(MediaError::Whisper(
            "no Whisper backend found, install whisper.cpp or openai-whisper".to_string(),
        ))
    }

    fn model_path(&self) -> PathBuf {
        Path::new(self.config.model_dir()).join(format!("ggml-{}.bin", self.config.model()))
    }

    fn build_command(&self, backend: Backend, audio_path: &Path, work_dir: &Path) -> Command {
        let mut cmd = Command::new(backend.command());

        match backend {
            Backend::WhisperCli | Backend::WhisperCpp => {
                let stem = audio_path.file_stem().unwrap_or_default();
                cmd.arg("-f")
                    .arg(audio_path)
                    .arg("-oj")
                    .arg("-of")
                    .arg(work_dir.join(stem))
                    .arg("-t")
                    .arg(self.config.threads().to_string())
                    .arg("-bs")
                    .arg(self.config.beam_size().to_string())
                    .arg("-m")
                    .arg(self.model_path());
                if let Some(language) = self.config.language() {
                    cmd.arg("-l").arg(language);
                }
                if !self.config.use_gpu() {
                    cmd.arg("-ng");
                }
            }
            Backend::Python => {
                cmd.arg(audio_path)
                    .arg("--model")
                    .arg(self.config.model())
                    .arg("--output_dir")
                    .arg(work_dir)
                    .arg("--output_format")
                    .arg("json")
                    .arg("--verbose")
                    .arg("False")
                    .arg("--beam_size")
                    .arg(self.config.beam_size().to_string());
                if let Some(language) = self.config.language() {
                    cmd.arg("--language").arg(language);
                }
                if !self.config.use_gpu() {
                    cmd.arg("--device").arg("cpu").arg("--fp16").arg("False");
                }
            }
        }

        cmd
    }

    fn work_dir_for(audio_path: &Path) -> PathBuf {
        let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
        std::env::temp_dir().join(format!("tubedigest_whisper_{}_{}", stem, std::process::id()))
    }

    async fn run_backend(&self, audio_path: &Path, work_dir: &Path) -> Result<Vec<Segment>> {
        let backend = Self::detect_backend().await?;
        let cmd = self.build_command(backend, audio_path, work_dir);

        info!(
            "Transcribing {} with {} ({} model)",
            audio_path.display(),
            backend.command(),
            self.config.model()
        );

        let output = run_with_timeout(cmd, backend.command(), self.config.timeout_seconds()).await?;
        if !output.status.success() {
            return Err(MediaError::Transcription(format!(
                "{} failed on {}: {}",
                backend.command(),
                audio_path.display(),
                failure_reason(&output)
            )));
        }

        let json_path = find_json_output(work_dir).await?.ok_or_else(|| {
            MediaError::Transcription(format!(
                "{} produced no JSON output in {}",
                backend.command(),
                work_dir.display()
            ))
        })?;

        let content = tokio::fs::read_to_string(&json_path).await?;
        parse_whisper_json(&content)
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        if !audio_path.is_file() {
            return Err(MediaError::Transcription(format!(
                "audio file not found: {}",
                audio_path.display()
            )));
        }

        let work_dir = Self::work_dir_for(audio_path);
        tokio::fs::create_dir_all(&work_dir).await?;

        let result = self.run_backend(audio_path, &work_dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            warn!("Failed to remove {}: {}", work_dir.display(), e);
        }

        result
    }
}

async fn find_json_output(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            found.push(path);
        }
    }

    found.sort();
    Ok(found.into_iter().next())
}

/// Whisper JSON output, either whisper.cpp or Python flavour
#[derive(Debug, Clone, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    transcription: Vec<WhisperTranscriptionSegment>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperTranscriptionSegment {
    timestamps: WhisperTimestamps,
    #[serde(default)]
    offsets: Option<WhisperOffsets>,
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperTimestamps {
    from: String,
    to: String,
}

/// Millisecond offsets
#[derive(Debug, Clone, Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Parse either whisper.cpp (`transcription[]`) or Python whisper
/// (`segments[]`) JSON into segments, in the order the backend emitted them.
pub(crate) fn parse_whisper_json(content: &str) -> Result<Vec<Segment>> {
    let output: WhisperOutput = serde_json::from_str(content)?;

    if !output.transcription.is_empty() {
        return output
            .transcription
            .into_iter()
            .map(|seg| {
                let (start, end) = match seg.offsets {
                    Some(offsets) => (offsets.from as f64 / 1000.0, offsets.to as f64 / 1000.0),
                    None => (
                        parse_timestamp(&seg.timestamps.from)?,
                        parse_timestamp(&seg.timestamps.to)?,
                    ),
                };
                Ok(Segment::new(start, end, seg.text.trim()))
            })
            .collect();
    }

    Ok(output
        .segments
        .into_iter()
        .map(|seg| Segment::new(seg.start, seg.end, seg.text.trim()))
        .collect())
}

/// Parse "HH:MM:SS,mmm" into seconds
pub(crate) fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let invalid = || MediaError::Whisper(format!("invalid timestamp: {}", timestamp));

    let (time_part, millis) = timestamp.split_once(',').ok_or_else(invalid)?;
    let millis: f64 = millis.parse().map_err(|_| invalid())?;

    let components: Vec<&str> = time_part.split(':').collect();
    if components.len() != 3 {
        return Err(invalid());
    }

    let mut seconds = 0.0;
    for part in components {
        let value: f64 = part.parse().map_err(|_| invalid())?;
        seconds = seconds * 60.0 + value;
    }

    Ok(seconds + millis / 1000.0)
}
