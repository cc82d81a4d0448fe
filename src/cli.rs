//! Entry points shared by the umbrella binary and the per-stage binaries

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use digest_media::{WhisperTranscriber, YtDlpSource};
use digest_llm::SummaryStrategy;
use std::path::PathBuf;

use crate::{init_logging, Config, FetchStage, StatusReport, SummarizeStage, TranscribeStage};

/// `--config` and `--verbose`, accepted by every binary
pub fn common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file (default: tubedigest.toml or config/tubedigest.toml)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}

/// Load configuration named by the matches and install logging
pub fn setup(matches: &ArgMatches) -> Result<Config> {
    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let config = Config::load(explicit.as_deref())?;
    init_logging(matches.get_flag("verbose"), &config.logging.level);
    tracing::debug!("{}", config.summary());
    Ok(config)
}

/// Fetch every item behind `url` and print one line per record written
pub async fn fetch(config: &Config, url: &str) -> Result<()> {
    let source = YtDlpSource::new(config.fetch.clone());
    let stage = FetchStage::new(source, config.layout(), config.fetch.audio_format());

    let outcome = stage.run(url).await?;
    outcome.stats.log("Fetch");

    println!("\nDownloaded items:");
    for record in &outcome.listed {
        let audio = record
            .audio_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "None".to_string());
        println!("- {}: {} -> {}", record.video_id, record.display_title(), audio);
    }

    Ok(())
}

pub async fn transcribe(config: &Config) -> Result<()> {
    let recognizer = WhisperTranscriber::new(config.transcription.clone());
    let stage = TranscribeStage::new(
        recognizer,
        config.layout(),
        config.transcription.audio_extensions(),
    );

    let stats = stage.run().await?;
    stats.log("Transcription");
    Ok(())
}

pub async fn summarize(config: &Config) -> Result<()> {
    let strategy = SummaryStrategy::select(&config.llm, &config.summarization).await?;
    let stage = SummarizeStage::new(
        strategy,
        config.layout(),
        config.summarization.min_transcript_chars(),
    );

    let stats = stage.run().await?;
    stats.log("Summarization");
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let report = StatusReport::collect(&config.layout(), config.transcription.audio_extensions()).await?;
    print!("{}", report.render());
    Ok(())
}
