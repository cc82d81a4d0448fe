use anyhow::{Context, Result};
use digest_core::{DataLayout, ItemDescriptor, ItemStatus, MetadataRecord, MetadataStore, StageError};
use digest_media::{locate_audio, MediaSource};
use tracing::{debug, info, warn};

use super::StageStats;

/// Result of one fetch run
#[derive(Debug)]
pub struct FetchOutcome {
    /// Records written by this run, in resolution order
    pub records: Vec<MetadataRecord>,
    /// Written records plus those of items already fetched, in resolution order
    pub listed: Vec<MetadataRecord>,
    pub stats: StageStats,
}

/// Resolves a source, retrieves audio per item and writes metadata records
pub struct FetchStage<S: MediaSource> {
    source: S,
    layout: DataLayout,
    store: MetadataStore,
    audio_ext: String,
}

impl<S: MediaSource> FetchStage<S> {
    pub fn new(source: S, layout: DataLayout, audio_ext: impl Into<String>) -> Self {
        let store = MetadataStore::new(layout.metadata_dir());
        Self {
            source,
            layout,
            store,
            audio_ext: audio_ext.into(),
        }
    }

    pub async fn run(&self, url: &str) -> Result<FetchOutcome> {
        self.layout
            .ensure_dirs()
            .await
            .context("Failed to create data directories")?;

        let items = self
            .source
            .resolve(url)
            .await
            .with_context(|| format!("Failed to resolve {}", url))?;
        info!("Fetching {} item(s)", items.len());

        let mut stats = StageStats::start();
        let mut records = Vec::new();
        let mut listed = Vec::new();

        for item in &items {
            let previous = self.load_previous(&item.id).await;
            if let Some(existing) = &previous {
                if locate_audio(&self.layout, &item.id, &self.audio_ext).await?.is_some() {
                    debug!("Skipping {}: audio and metadata already present", item.id);
                    stats.skipped += 1;
                    listed.push(existing.clone());
                    continue;
                }
            }

            if let Err(e) = self.retrieve(item).await {
                warn!("{}", e);
                stats.failed += 1;
                continue;
            }

            let record = self.record_for(item, previous).await?;
            self.store
                .write(&record)
                .await
                .with_context(|| format!("Failed to write metadata for {}", item.id))?;

            if record.status == ItemStatus::Failed {
                warn!("No audio file found for {} after retrieval", item.id);
                stats.failed += 1;
            } else {
                stats.processed += 1;
            }
            listed.push(record.clone());
            records.push(record);
        }

        Ok(FetchOutcome {
            records,
            listed,
            stats: stats.finish(),
        })
    }

    /// Existing record for `video_id`; an unreadable one counts as absent
    async fn load_previous(&self, video_id: &str) -> Option<MetadataRecord> {
        match self.store.load(video_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable metadata for {}: {}", video_id, e);
                None
            }
        }
    }

    async fn retrieve(&self, item: &ItemDescriptor) -> std::result::Result<(), StageError> {
        info!("Retrieving audio for {} ({})", item.id, item.title.as_deref().unwrap_or("untitled"));
        self.source
            .fetch_one(item, self.layout.audio_dir())
            .await
            .map_err(|e| StageError::retrieval(&item.id, e))
    }

    /// Fresh record for `item`, keeping later-stage fields of an existing one
    async fn record_for(
        &self,
        item: &ItemDescriptor,
        previous: Option<MetadataRecord>,
    ) -> Result<MetadataRecord> {
        let audio = locate_audio(&self.layout, &item.id, &self.audio_ext).await?;
        let mut record = MetadataRecord::fetched(item, audio);

        if let Some(previous) = previous {
            record.transcript_path = previous.transcript_path;
            record.summary_path = previous.summary_path;
            record.extra = previous.extra;
            let advanced = matches!(
                previous.status,
                ItemStatus::Transcribed | ItemStatus::Summarized
            );
            if record.status == ItemStatus::Fetched && advanced {
                record.status = previous.status;
            }
        }

        Ok(record)
    }
}
