//! Read-only pipeline status report

use anyhow::Result;
use digest_core::{ArtifactScanner, DataLayout, ItemStage, ItemStatus, MetadataStore};
use std::fmt::Write as _;

/// One item's artifact stage next to what its record says
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub video_id: String,
    pub stage: ItemStage,
    pub recorded: Option<ItemStatus>,
    pub segments_missing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    /// Scan the layout; entries come out sorted by id
    pub async fn collect<I, S>(layout: &DataLayout, audio_extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scanner = ArtifactScanner::new(audio_extensions);
        let store = MetadataStore::new(layout.metadata_dir());

        let mut entries = Vec::new();
        for snapshot in scanner.snapshot_all(layout).await? {
            let recorded = if snapshot.has_metadata {
                match store.load(&snapshot.video_id).await {
                    Ok(record) => record.map(|r| r.status),
                    Err(e) => {
                        tracing::warn!("Unreadable metadata for {}: {}", snapshot.video_id, e);
                        None
                    }
                }
            } else {
                None
            };

            entries.push(StatusEntry {
                stage: snapshot.stage(),
                segments_missing: snapshot.segments_missing(),
                video_id: snapshot.video_id,
                recorded,
            });
        }

        Ok(Self { entries })
    }

    /// Number of entries at `stage`
    pub fn count(&self, stage: ItemStage) -> usize {
        self.entries.iter().filter(|e| e.stage == stage).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        for entry in &self.entries {
            let recorded = entry.recorded.map(|s| s.as_str()).unwrap_or("-");
            let _ = write!(
                out,
                "{:<24} {:<12} record={}",
                entry.video_id,
                entry.stage.status_string(),
                recorded
            );
            if entry.segments_missing {
                out.push_str(" segments-missing");
            }
            out.push('\n');
        }

        let totals: Vec<String> = [
            ItemStage::Unseen,
            ItemStage::Fetched,
            ItemStage::Transcribed,
            ItemStage::Summarized,
        ]
        .iter()
        .map(|stage| format!("{}: {}", stage.status_string(), self.count(*stage)))
        .collect();
        let _ = writeln!(out, "{} item(s); {}", self.entries.len(), totals.join(", "));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digest_core::{ItemDescriptor, MetadataRecord};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_report() {
        let temp_dir = TempDir::new().unwrap();
        let layout = DataLayout::new(temp_dir.path());
        layout.ensure_dirs().await.unwrap();

        let store = MetadataStore::new(layout.metadata_dir());
        let audio = layout.audio_path("b", "mp3");
        tokio::fs::write(&audio, b"audio").await.unwrap();
        store
            .write(&MetadataRecord::fetched(&ItemDescriptor::new("b"), Some(audio)))
            .await
            .unwrap();
        tokio::fs::write(layout.audio_path("a", "mp3"), b"audio").await.unwrap();
        tokio::fs::write(layout.transcript_text_path("a"), b"text").await.unwrap();

        let report = StatusReport::collect(&layout, ["mp3"]).await.unwrap();
        let ids: Vec<&str> = report.entries.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(report.entries[0].stage, ItemStage::Transcribed);
        assert!(report.entries[0].segments_missing);
        assert_eq!(report.entries[1].recorded, Some(ItemStatus::Fetched));

        let rendered = report.render();
        assert!(rendered.contains("segments-missing"));
        assert!(rendered.contains("record=fetched"));
        assert!(rendered.contains("2 item(s); unseen: 0, fetched: 1, transcribed: 1, summarized: 0"));
    }
}
