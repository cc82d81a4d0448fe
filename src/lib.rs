//! tubedigest - download, transcribe and summarize online video audio
//!
//! Three independently run stages share a `data/` tree and a per-item JSON
//! metadata record. Each stage skips items whose output file already exists,
//! so any stage can be re-run after a crash.

pub mod cli;
pub mod config;
pub mod stages;
pub mod status;

pub use crate::config::{Config, ConfigBuilder};
pub use crate::stages::{FetchOutcome, FetchStage, StageStats, SummarizeStage, TranscribeStage};
pub use crate::status::{StatusEntry, StatusReport};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `verbose` forces `debug`; otherwise `RUST_LOG` wins over `level`.
pub fn init_logging(verbose: bool, level: &str) {
    if verbose {
        tracing_subscriber::fmt()
            .with_target(true)
            .with_thread_ids(true)
            .with_env_filter("debug")
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_env_filter(filter)
            .init();
    }
}
