use async_trait::async_trait;
use digest_core::{DataLayout, ItemDescriptor, ItemStatus, MetadataRecord, MetadataStore, Segment};
use digest_llm::{
    AbstractiveSummarizer, ChatMessage, LLMError, LLMProvider, LLMResponse, StrategyKind,
    SummaryConfig, SummaryStrategy, LLM,
};
use digest_media::{MediaError, MediaSource, SpeechRecognizer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;
use tubedigest::{FetchStage, SummarizeStage, TranscribeStage};

const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "m4a", "webm"];

/// Media source that "downloads" by writing a small file per item
struct MockSource {
    items: Vec<ItemDescriptor>,
    /// Extension written per id; ids absent here produce no file
    extensions: HashMap<String, String>,
    failing: Vec<String>,
    fetches: Arc<AtomicUsize>,
}

impl MockSource {
    fn new(items: Vec<ItemDescriptor>) -> Self {
        let extensions = items
            .iter()
            .map(|item| (item.id.clone(), "mp3".to_string()))
            .collect();
        Self {
            items,
            extensions,
            failing: Vec::new(),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_extension(mut self, id: &str, ext: Option<&str>) -> Self {
        match ext {
            Some(ext) => self.extensions.insert(id.to_string(), ext.to_string()),
            None => self.extensions.remove(id),
        };
        self
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing.push(id.to_string());
        self
    }
}

#[async_trait]
impl MediaSource for MockSource {
    async fn resolve(&self, _source: &str) -> digest_media::Result<Vec<ItemDescriptor>> {
        Ok(self.items.clone())
    }

    async fn fetch_one(&self, item: &ItemDescriptor, audio_dir: &Path) -> digest_media::Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&item.id) {
            return Err(MediaError::Download {
                url: item.id.clone(),
                reason: "HTTP Error 403: Forbidden".to_string(),
            });
        }
        if let Some(ext) = self.extensions.get(&item.id) {
            fs::write(audio_dir.join(format!("{}.{}", item.id, ext)), b"audio").await?;
        }
        Ok(())
    }
}

/// Recognizer returning canned segments per file stem
struct MockRecognizer {
    segments: HashMap<String, Vec<Segment>>,
    calls: Arc<AtomicUsize>,
}

impl MockRecognizer {
    fn new() -> Self {
        Self {
            segments: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with(mut self, id: &str, segments: Vec<Segment>) -> Self {
        self.segments.insert(id.to_string(), segments);
        self
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn transcribe(&self, audio_path: &Path) -> digest_media::Result<Vec<Segment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.segments
            .get(&stem)
            .cloned()
            .ok_or_else(|| MediaError::Transcription(format!("cannot decode {}", stem)))
    }
}

/// Chat model that counts calls and can refuse the availability probe.
///
/// Prompts containing `reject` get an error response.
struct CountingLLM {
    calls: Arc<AtomicUsize>,
    available: bool,
    reject: Option<&'static str>,
}

#[async_trait]
impl LLM for CountingLLM {
    async fn chat(&self, messages: Vec<ChatMessage>) -> digest_llm::Result<LLMResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(marker) = self.reject {
            if messages.iter().any(|m| m.content().contains(marker)) {
                return Err(LLMError::ResponseError("model overloaded".to_string()));
            }
        }
        Ok(LLMResponse::new(format!(" chunk summary {} ", n), None))
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

async fn strategy_with(available: bool, config: &SummaryConfig) -> (SummaryStrategy, Arc<AtomicUsize>) {
    strategy_rejecting(available, None, config).await
}

async fn strategy_rejecting(
    available: bool,
    reject: Option<&'static str>,
    config: &SummaryConfig,
) -> (SummaryStrategy, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let llm = CountingLLM {
        calls: calls.clone(),
        available,
        reject,
    };
    let attempt = AbstractiveSummarizer::initialize_with(Box::new(llm), config).await;
    (SummaryStrategy::choose(attempt, config).unwrap(), calls)
}

fn descriptor(id: &str, title: &str) -> ItemDescriptor {
    ItemDescriptor::new(id)
        .with_title(title)
        .with_webpage_url(format!("https://www.youtube.com/watch?v={}", id))
        .with_duration(120.0)
}

async fn seed_record(layout: &DataLayout, id: &str) -> MetadataRecord {
    let audio = layout.audio_path(id, "mp3");
    fs::write(&audio, b"audio").await.unwrap();
    let record = MetadataRecord::fetched(&descriptor(id, id), Some(audio));
    MetadataStore::new(layout.metadata_dir())
        .write(&record)
        .await
        .unwrap();
    record
}

fn long_text(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Sentence number {} talks about topic {} in some detail.", i, i % 3))
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test]
async fn test_fetch_writes_records_in_resolution_order() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());

    let source = MockSource::new(vec![
        descriptor("zz9", "Last alphabetically"),
        descriptor("bad", "Forbidden"),
        descriptor("aa1", "Odd codec"),
        descriptor("nofile", "Vanished"),
    ])
    .failing("bad")
    .with_extension("aa1", Some("webm"))
    .with_extension("nofile", None);

    let stage = FetchStage::new(source, layout.clone(), "mp3");
    let outcome = stage.run("https://www.youtube.com/playlist?list=PL1").await.unwrap();

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["zz9", "aa1", "nofile"]);
    assert_eq!(outcome.stats.processed, 2);
    assert_eq!(outcome.stats.failed, 2);

    // A failed retrieval leaves nothing behind
    assert!(!layout.metadata_path("bad").exists());

    // Codec mismatch falls back to the prefix match
    assert_eq!(outcome.records[1].audio_path, Some(layout.audio_path("aa1", "webm")));

    // Retrieval "succeeded" but no file: record with a null path
    let store = MetadataStore::new(layout.metadata_dir());
    let vanished = store.load("nofile").await.unwrap().unwrap();
    assert!(vanished.audio_path.is_none());
    assert_eq!(vanished.status, ItemStatus::Failed);
    let raw = fs::read_to_string(layout.metadata_path("nofile")).await.unwrap();
    assert!(raw.contains("\"audio_path\": null"));
}

#[tokio::test]
async fn test_fetch_twice_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());

    let source = MockSource::new(vec![descriptor("abc", "Title")]);
    let fetches = source.fetches.clone();
    let stage = FetchStage::new(source, layout.clone(), "mp3");

    stage.run("https://youtu.be/abc").await.unwrap();
    let before = fs::read(layout.metadata_path("abc")).await.unwrap();

    let second = stage.run("https://youtu.be/abc").await.unwrap();
    let after = fs::read(layout.metadata_path("abc")).await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(second.records.is_empty());
    assert_eq!(second.stats.skipped, 1);

    // Already-fetched items are still listed for the operator
    let listed: Vec<&str> = second.listed.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(listed, vec!["abc"]);
    assert_eq!(second.listed[0].audio_path, Some(layout.audio_path("abc", "mp3")));
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_refetch_keeps_later_stage_fields() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    let store = MetadataStore::new(layout.metadata_dir());
    let mut record = MetadataRecord::fetched(&descriptor("abc", "Old title"), None);
    record.mark_transcribed(&layout.transcript_text_path("abc"));
    store.write(&record).await.unwrap();

    let stage = FetchStage::new(MockSource::new(vec![descriptor("abc", "New title")]), layout.clone(), "mp3");
    stage.run("https://youtu.be/abc").await.unwrap();

    let loaded = store.load("abc").await.unwrap().unwrap();
    assert_eq!(loaded.title.as_deref(), Some("New title"));
    assert_eq!(loaded.audio_path, Some(layout.audio_path("abc", "mp3")));
    assert_eq!(loaded.transcript_path, Some(layout.transcript_text_path("abc")));
    assert_eq!(loaded.status, ItemStatus::Transcribed);
}

#[tokio::test]
async fn test_corrupt_record_does_not_abort_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    // Left behind by an interrupted write
    fs::write(layout.metadata_path("a"), r#"{"video_id": "a", "#).await.unwrap();
    fs::write(layout.audio_path("a", "mp3"), b"audio").await.unwrap();

    let source = MockSource::new(vec![descriptor("a", "First"), descriptor("b", "Second")]);
    let fetches = source.fetches.clone();
    let stage = FetchStage::new(source, layout.clone(), "mp3");
    let outcome = stage.run("https://www.youtube.com/playlist?list=PL2").await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.stats.processed, 2);

    let store = MetadataStore::new(layout.metadata_dir());
    let rewritten = store.load("a").await.unwrap().unwrap();
    assert_eq!(rewritten.title.as_deref(), Some("First"));
    assert_eq!(rewritten.status, ItemStatus::Fetched);
    assert!(rewritten.transcript_path.is_none());
    assert!(store.load("b").await.unwrap().is_some());
}

#[tokio::test]
async fn test_transcribe_updates_record_without_losing_audio_path() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();
    let seeded = seed_record(&layout, "abc").await;

    let recognizer = MockRecognizer::new().with(
        "abc",
        vec![
            Segment::new(4.0, 6.0, " third "),
            Segment::new(0.0, 2.0, "first"),
            Segment::new(2.0, 1.5, " second"),
        ],
    );
    let stage = TranscribeStage::new(recognizer, layout.clone(), AUDIO_EXTENSIONS);
    let stats = stage.run().await.unwrap();
    assert_eq!(stats.processed, 1);

    let text = fs::read_to_string(layout.transcript_text_path("abc")).await.unwrap();
    assert_eq!(text, "first second third");

    let raw = fs::read_to_string(layout.transcript_segments_path("abc")).await.unwrap();
    let segments: Vec<Segment> = serde_json::from_str(&raw).unwrap();
    assert_eq!(segments.len(), 3);
    for pair in segments.windows(2) {
        assert!(pair[1].start >= pair[0].start);
    }
    assert!(segments.iter().all(|s| s.end >= s.start));

    let record = MetadataStore::new(layout.metadata_dir())
        .load("abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.audio_path, seeded.audio_path);
    assert_eq!(record.transcript_path, Some(layout.transcript_text_path("abc")));
    assert_eq!(record.status, ItemStatus::Transcribed);
}

#[tokio::test]
async fn test_transcribe_twice_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();
    seed_record(&layout, "abc").await;

    let recognizer = MockRecognizer::new().with("abc", vec![Segment::new(0.0, 1.0, "hello")]);
    let calls = recognizer.calls.clone();
    let stage = TranscribeStage::new(recognizer, layout.clone(), AUDIO_EXTENSIONS);

    stage.run().await.unwrap();
    let record_before = fs::read(layout.metadata_path("abc")).await.unwrap();

    let second = stage.run().await.unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(fs::read(layout.metadata_path("abc")).await.unwrap(), record_before);
}

#[tokio::test]
async fn test_text_file_alone_is_the_transcription_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    fs::write(layout.audio_path("x", "mp3"), b"audio").await.unwrap();
    fs::write(layout.transcript_text_path("x"), b"partial run").await.unwrap();

    let recognizer = MockRecognizer::new().with("x", vec![Segment::new(0.0, 1.0, "redo")]);
    let calls = recognizer.calls.clone();
    let stage = TranscribeStage::new(recognizer, layout.clone(), AUDIO_EXTENSIONS);
    let stats = stage.run().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(stats.skipped, 1);
    assert!(!layout.transcript_segments_path("x").exists());
    assert_eq!(
        fs::read_to_string(layout.transcript_text_path("x")).await.unwrap(),
        "partial run"
    );
}

#[tokio::test]
async fn test_transcribe_failure_does_not_stop_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    // No record for either item: transcripts appear, records do not
    fs::write(layout.audio_path("a_broken", "mp3"), b"audio").await.unwrap();
    fs::write(layout.audio_path("b_fine", "m4a"), b"audio").await.unwrap();
    fs::write(layout.audio_dir().join("notes.txt"), b"not audio").await.unwrap();

    let recognizer = MockRecognizer::new().with("b_fine", vec![Segment::new(0.0, 1.0, "ok")]);
    let stage = TranscribeStage::new(recognizer, layout.clone(), AUDIO_EXTENSIONS);
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.processed, 1);
    assert!(!layout.transcript_text_path("a_broken").exists());
    assert!(layout.transcript_text_path("b_fine").exists());
    assert!(!layout.metadata_path("b_fine").exists());
}

#[tokio::test]
async fn test_summarize_skips_short_transcripts() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    // 99 characters once trimmed
    let short = format!("   {}   \n", "y".repeat(99));
    fs::write(layout.transcript_text_path("short"), short).await.unwrap();

    let config = SummaryConfig::default();
    let (strategy, calls) = strategy_with(true, &config).await;
    let stage = SummarizeStage::new(strategy, layout.clone(), config.min_transcript_chars());
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!layout.summary_path("short").exists());
}

#[tokio::test]
async fn test_transcript_at_minimum_length_is_summarized() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    fs::write(layout.transcript_text_path("edge"), format!("\n{}  ", "y".repeat(100)))
        .await
        .unwrap();

    let config = SummaryConfig::default();
    let (strategy, calls) = strategy_with(true, &config).await;
    let stage = SummarizeStage::new(strategy, layout.clone(), config.min_transcript_chars());
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        fs::read_to_string(layout.summary_path("edge")).await.unwrap(),
        "chunk summary 1"
    );
}

#[tokio::test]
async fn test_summarize_failure_does_not_stop_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    fs::write(layout.transcript_text_path("a_rejected"), "poison ".repeat(30))
        .await
        .unwrap();
    fs::write(layout.transcript_text_path("b_fine"), "x".repeat(300)).await.unwrap();

    let config = SummaryConfig::default();
    let (strategy, _calls) = strategy_rejecting(true, Some("poison"), &config).await;
    let stage = SummarizeStage::new(strategy, layout.clone(), config.min_transcript_chars());
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.processed, 1);
    assert!(!layout.summary_path("a_rejected").exists());
    assert!(layout.summary_path("b_fine").exists());
}

#[tokio::test]
async fn test_abstractive_run_chunks_and_updates_record() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();
    seed_record(&layout, "abc").await;

    fs::write(layout.transcript_text_path("abc"), "z".repeat(12_000)).await.unwrap();

    let config = SummaryConfig::default();
    let (strategy, calls) = strategy_with(true, &config).await;
    let stage = SummarizeStage::new(strategy, layout.clone(), config.min_transcript_chars());
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.strategy, Some(StrategyKind::Abstractive));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        fs::read_to_string(layout.summary_path("abc")).await.unwrap(),
        "chunk summary 1 chunk summary 2 chunk summary 3"
    );

    let record = MetadataStore::new(layout.metadata_dir())
        .load("abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.summary_path, Some(layout.summary_path("abc")));
    assert_eq!(record.audio_path, Some(layout.audio_path("abc", "mp3")));
    assert_eq!(record.status, ItemStatus::Summarized);

    let second = stage.run().await.unwrap();
    assert_eq!(second.skipped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_initialization_summarizes_whole_run_extractively() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());
    layout.ensure_dirs().await.unwrap();

    for id in ["one", "two", "three"] {
        fs::write(layout.transcript_text_path(id), long_text(8)).await.unwrap();
    }

    let config = SummaryConfig::default().with_sentence_count(2);
    let (strategy, calls) = strategy_with(false, &config).await;
    let stage = SummarizeStage::new(strategy, layout.clone(), config.min_transcript_chars());
    let stats = stage.run().await.unwrap();

    assert_eq!(stats.strategy, Some(StrategyKind::Extractive));
    assert_eq!(stats.processed, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let source = long_text(8);
    for id in ["one", "two", "three"] {
        assert!(!layout.metadata_path(id).exists());
        let summary = fs::read_to_string(layout.summary_path(id)).await.unwrap();
        let picked: Vec<&str> = summary.split_inclusive(". ").map(str::trim).collect();
        assert_eq!(picked.len(), 2);
        for sentence in picked {
            assert!(source.contains(sentence), "{} not in transcript", sentence);
        }
    }
}
