//! Stage runners: fetch, transcribe, summarize.
//!
//! Each runner walks its inputs one item at a time. Per-item failures are
//! [`digest_core::StageError`]s that get logged and counted; anything else
//! aborts the run.

pub mod fetch;
pub mod stats;
pub mod summarize;
pub mod transcribe;

pub use fetch::{FetchOutcome, FetchStage};
pub use stats::StageStats;
pub use summarize::SummarizeStage;
pub use transcribe::TranscribeStage;
