use anyhow::Result;
use clap::{Arg, Command};
use tubedigest::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let command = Command::new("tubedigest")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Download, transcribe and summarize online video audio")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("fetch")
                .about("Download audio for a video or playlist URL")
                .arg(
                    Arg::new("url")
                        .value_name("URL")
                        .help("Video or playlist URL")
                        .required(true),
                ),
        )
        .subcommand(Command::new("transcribe").about("Transcribe audio files without a transcript"))
        .subcommand(Command::new("summarize").about("Summarize transcripts without a summary"))
        .subcommand(Command::new("status").about("Show per-item pipeline progress"));

    let matches = cli::common_args(command).get_matches();
    let config = cli::setup(&matches)?;

    match matches.subcommand() {
        Some(("fetch", sub)) => {
            let url = sub
                .get_one::<String>("url")
                .ok_or_else(|| anyhow::anyhow!("missing URL"))?;
            cli::fetch(&config, url).await
        }
        Some(("transcribe", _)) => cli::transcribe(&config).await,
        Some(("summarize", _)) => cli::summarize(&config).await,
        Some(("status", _)) => cli::status(&config).await,
        _ => unreachable!("subcommand_required"),
    }
}
