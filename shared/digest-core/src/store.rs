//! Directory-backed metadata store with whole-record read-modify-write

use crate::{ArtifactScanner, CoreError, MetadataRecord, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// One pretty-printed JSON file per item under the metadata directory.
///
/// There is no locking: stages run one at a time, and every update reads the
/// entire record, changes it in memory and writes the entire record back.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn record_path(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", video_id))
    }

    /// Write a record, replacing any previous one for the same id
    pub async fn write(&self, record: &MetadataRecord) -> Result<PathBuf> {
        let path = self.record_path(&record.video_id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).await?;
        tracing::debug!("Metadata written: {}", path.display());
        Ok(path)
    }

    /// Load a record; `Ok(None)` when there is none for this id
    pub async fn load(&self, video_id: &str) -> Result<Option<MetadataRecord>> {
        let path = self.record_path(video_id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: MetadataRecord = serde_json::from_str(&content)?;
        if record.video_id != video_id {
            return Err(CoreError::IdMismatch {
                expected: video_id.to_string(),
                found: record.video_id,
            });
        }
        Ok(Some(record))
    }

    /// Read-modify-write an existing record.
    ///
    /// Returns `Ok(None)` without creating anything when no record exists.
    /// `video_id` is immutable: an edit that changes it is rejected and
    /// nothing is written.
    pub async fn update<F>(&self, video_id: &str, edit: F) -> Result<Option<MetadataRecord>>
    where
        F: FnOnce(&mut MetadataRecord),
    {
        let Some(mut record) = self.load(video_id).await? else {
            tracing::debug!("No metadata record for {}, skipping update", video_id);
            return Ok(None);
        };

        edit(&mut record);

        if record.video_id != video_id {
            return Err(CoreError::IdMismatch {
                expected: video_id.to_string(),
                found: record.video_id,
            });
        }

        self.write(&record).await?;
        Ok(Some(record))
    }

    /// Ids of all stored records, lexicographically sorted
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        let scanner = ArtifactScanner::new(["json"]);
        let files = scanner.scan(&self.dir).await?;
        Ok(files
            .iter()
            .filter_map(|path| ArtifactScanner::item_id(path, ""))
            .collect())
    }
}
