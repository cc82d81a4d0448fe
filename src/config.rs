use anyhow::{anyhow, Context, Result};
use digest_core::DataLayout;
use digest_llm::{LLMConfig, LLMProvider, SummaryConfig};
use digest_media::{FetchConfig, TranscriptionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files searched, in order, when no `--config` is given
pub const CONFIG_PATHS: [&str; 2] = ["tubedigest.toml", "config/tubedigest.toml"];

/// Configuration for the tubedigest pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the `data/` tree lives
    pub paths: PathsConfig,

    /// yt-dlp retrieval settings
    pub fetch: FetchConfig,

    /// Whisper settings
    pub transcription: TranscriptionConfig,

    /// Summary lengths, chunking and strategy switch
    pub summarization: SummaryConfig,

    /// Chat model used by the abstractive strategy
    pub llm: LLMConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory containing `data/`
    pub base_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, apply environment overrides and validate.
    ///
    /// An explicit path must exist and parse. Without one, the first of
    /// [`CONFIG_PATHS`] that exists is used, and defaults apply if none does.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::from_search_paths()?,
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    fn from_search_paths() -> Result<Self> {
        for path in CONFIG_PATHS {
            let path = Path::new(path);
            if path.is_file() {
                return Self::from_file(path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Apply `TUBEDIGEST_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_dir) = lookup("TUBEDIGEST_BASE_DIR") {
            self.paths.base_dir = PathBuf::from(base_dir);
        }

        if let Some(level) = lookup("TUBEDIGEST_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(model) = lookup("TUBEDIGEST_WHISPER_MODEL") {
            self.transcription = std::mem::take(&mut self.transcription).with_model(model);
        }

        if let Some(endpoint) = lookup("TUBEDIGEST_LLM_ENDPOINT") {
            self.llm = std::mem::take(&mut self.llm).with_endpoint(Some(endpoint));
        }

        if let Some(model) = lookup("TUBEDIGEST_LLM_MODEL") {
            self.llm = std::mem::take(&mut self.llm).with_model(model);
        }

        let api_key = lookup("TUBEDIGEST_LLM_API_KEY").or_else(|| {
            match (self.llm.provider(), self.llm.api_key()) {
                (LLMProvider::OpenAI, None) => lookup("OPENAI_API_KEY"),
                _ => None,
            }
        });
        if let Some(key) = api_key {
            self.llm = std::mem::take(&mut self.llm).with_api_key(Some(key));
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let summary = &self.summarization;

        if summary.chunk_size() == 0 {
            return Err(anyhow!("summarization.chunk_size must be greater than 0"));
        }

        if summary.min_length() > summary.max_length() {
            return Err(anyhow!(
                "summarization.min_length ({}) exceeds max_length ({})",
                summary.min_length(),
                summary.max_length()
            ));
        }

        if summary.sentence_count() == 0 {
            return Err(anyhow!("summarization.sentence_count must be greater than 0"));
        }

        Ok(())
    }

    /// On-disk layout rooted at `paths.base_dir`
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.paths.base_dir)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "tubedigest configuration:\n\
            - Base Directory: {}\n\
            - Audio Format: {}\n\
            - Whisper Model: {}\n\
            - LLM: {:?} {} at {}\n\
            - Abstractive Enabled: {}",
            self.paths.base_dir.display(),
            self.fetch.audio_format(),
            self.transcription.model(),
            self.llm.provider(),
            self.llm.model(),
            self.llm.resolved_endpoint(),
            self.summarization.enable_abstractive()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.base_dir = dir.into();
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    pub fn with_transcription(mut self, transcription: TranscriptionConfig) -> Self {
        self.config.transcription = transcription;
        self
    }

    pub fn with_summarization(mut self, summarization: SummaryConfig) -> Self {
        self.config.summarization = summarization;
        self
    }

    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.config.llm = llm;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.base_dir, PathBuf::from("."));
        assert_eq!(config.summarization.chunk_size(), 5000);
        assert_eq!(config.transcription.model(), "small");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tubedigest.toml");
        std::fs::write(
            &path,
            "[paths]\nbase_dir = \"/srv/digest\"\n\n[summarization]\nsentence_count = 3\n\n[llm]\nprovider = \"OpenAI\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.paths.base_dir, PathBuf::from("/srv/digest"));
        assert_eq!(config.summarization.sentence_count(), 3);
        assert_eq!(config.summarization.chunk_size(), 5000);
        assert_eq!(config.llm.provider(), LLMProvider::OpenAI);
        assert_eq!(config.fetch.audio_format(), "mp3");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/tubedigest.toml"))).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("TUBEDIGEST_BASE_DIR", "/data/root"),
            ("TUBEDIGEST_WHISPER_MODEL", "medium"),
            ("TUBEDIGEST_LLM_MODEL", "qwen"),
            ("TUBEDIGEST_LOG_LEVEL", "warn"),
        ]));

        assert_eq!(config.paths.base_dir, PathBuf::from("/data/root"));
        assert_eq!(config.transcription.model(), "medium");
        assert_eq!(config.llm.model(), "qwen");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_openai_key_fallback() {
        let mut config = ConfigBuilder::new()
            .with_llm(LLMConfig::default().with_provider(LLMProvider::OpenAI))
            .build();
        config.apply_env(env(&[("OPENAI_API_KEY", "sk-fallback")]));
        assert_eq!(config.llm.api_key(), Some("sk-fallback"));

        let mut config = Config::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "sk-fallback")]));
        assert_eq!(config.llm.api_key(), None);
    }

    #[test]
    fn test_config_validation() {
        let config = ConfigBuilder::new()
            .with_summarization(SummaryConfig::default().with_chunk_size(0))
            .build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_summarization(SummaryConfig::default().with_lengths(500, 100))
            .build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_summarization(SummaryConfig::default().with_sentence_count(0))
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_follows_base_dir() {
        let config = ConfigBuilder::new().with_base_dir("/srv/digest").build();
        assert_eq!(
            config.layout().metadata_path("abc"),
            PathBuf::from("/srv/digest/data/metadata/abc.json")
        );
    }
}
