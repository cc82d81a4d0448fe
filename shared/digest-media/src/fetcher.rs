//! Media retrieval through yt-dlp

use async_trait::async_trait;
use digest_core::ItemDescriptor;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::process::{failure_reason, run_with_timeout};
use crate::{MediaError, Result};

/// Resolves a source URL into items and retrieves their audio
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Expand a single video or a collection URL into item descriptors
    async fn resolve(&self, source: &str) -> Result<Vec<ItemDescriptor>>;

    /// Retrieve audio for one item into `audio_dir` as `<id>.<ext>`
    async fn fetch_one(&self, item: &ItemDescriptor, audio_dir: &Path) -> Result<()>;
}

/// Turn yt-dlp's `-J` output into descriptors.
///
/// A collection carries an `entries` array whose elements may be null or
/// lack an id; those are dropped. Anything else is treated as one video.
pub fn parse_resolution(info: &Value) -> Vec<ItemDescriptor> {
    match info.get("entries").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => {
            entries.iter().filter_map(descriptor_from_entry).collect()
        }
        _ => descriptor_from_entry(info).into_iter().collect(),
    }
}

fn descriptor_from_entry(entry: &Value) -> Option<ItemDescriptor> {
    let id = entry.get("id").and_then(Value::as_str)?;
    let mut descriptor = ItemDescriptor::new(id);

    if let Some(title) = entry.get("title").and_then(Value::as_str) {
        descriptor = descriptor.with_title(title);
    }

    // Flat playlist entries only carry `url`
    let page = entry
        .get("webpage_url")
        .or_else(|| entry.get("url"))
        .and_then(Value::as_str);
    if let Some(page) = page {
        descriptor = descriptor.with_webpage_url(page);
    }

    if let Some(duration) = entry.get("duration").and_then(Value::as_f64) {
        descriptor = descriptor.with_duration(duration);
    }

    Some(descriptor)
}

/// `MediaSource` backed by the yt-dlp command-line tool
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    config: FetchConfig,
}

impl YtDlpSource {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn validate_source(source: &str) -> Result<Url> {
        let url = Url::parse(source)
            .map_err(|e| MediaError::InvalidSource(format!("{}: {}", source, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(MediaError::InvalidSource(format!(
                "unsupported scheme '{}' in {}",
                other, source
            ))),
        }
    }

    fn output_template(audio_dir: &Path) -> String {
        audio_dir.join("%(id)s.%(ext)s").to_string_lossy().to_string()
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn resolve(&self, source: &str) -> Result<Vec<ItemDescriptor>> {
        let url = Self::validate_source(source)?;
        info!("Resolving {}", url);

        let mut cmd = Command::new(self.config.binary());
        cmd.arg("-J")
            .arg("--ignore-errors")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url.as_str());

        let output = run_with_timeout(cmd, self.config.binary(), self.config.timeout_seconds()).await?;

        // Unavailable collection entries make yt-dlp exit non-zero while the
        // rest of the collection is still printed on stdout
        let info: Value = match serde_json::from_slice(&output.stdout) {
            Ok(info) => info,
            Err(_) if !output.status.success() => {
                return Err(MediaError::Download {
                    url: source.to_string(),
                    reason: failure_reason(&output),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if !output.status.success() {
            warn!(
                "yt-dlp reported errors while resolving {}: {}",
                source,
                failure_reason(&output)
            );
        }

        let items = parse_resolution(&info);
        info!("Resolved {} item(s) from {}", items.len(), source);
        Ok(items)
    }

    async fn fetch_one(&self, item: &ItemDescriptor, audio_dir: &Path) -> Result<()> {
        let target = item.webpage_url.clone().unwrap_or_else(|| item.id.clone());
        debug!("Fetching audio for {} from {}", item.id, target);

        let mut cmd = Command::new(self.config.binary());
        cmd.arg("-f")
            .arg(self.config.format())
            .arg("-x")
            .arg("--audio-format")
            .arg(self.config.audio_format())
            .arg("--audio-quality")
            .arg(self.config.audio_quality())
            .arg("-o")
            .arg(Self::output_template(audio_dir))
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&target);

        let output = run_with_timeout(cmd, self.config.binary(), self.config.timeout_seconds()).await?;
        if !output.status.success() {
            return Err(MediaError::Download {
                url: target,
                reason: failure_reason(&output),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_source() {
        assert!(YtDlpSource::validate_source("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(YtDlpSource::validate_source("not a url").is_err());
        assert!(YtDlpSource::validate_source("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_entry_without_id_is_dropped() {
        assert!(descriptor_from_entry(&json!({"title": "no id"})).is_none());
    }

    #[test]
    fn test_flat_entry_uses_url() {
        let descriptor =
            descriptor_from_entry(&json!({"id": "x", "url": "https://youtu.be/x"})).unwrap();
        assert_eq!(descriptor.webpage_url.as_deref(), Some("https://youtu.be/x"));
        assert!(descriptor.title.is_none());
        assert!(descriptor.duration.is_none());
    }

    #[test]
    fn test_output_template() {
        let template = YtDlpSource::output_template(Path::new("/data/audio"));
        assert_eq!(template, "/data/audio/%(id)s.%(ext)s");
    }
}
