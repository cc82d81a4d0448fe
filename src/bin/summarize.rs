use anyhow::Result;
use clap::Command;
use tubedigest::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let command = Command::new("tubedigest-summarize")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize every transcript that has no summary yet");

    let matches = cli::common_args(command).get_matches();
    let config = cli::setup(&matches)?;
    cli::summarize(&config).await
}
