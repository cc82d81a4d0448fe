use anyhow::Result;
use clap::Command;
use tubedigest::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let command = Command::new("tubedigest-transcribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transcribe every audio file that has no transcript yet");

    let matches = cli::common_args(command).get_matches();
    let config = cli::setup(&matches)?;
    cli::transcribe(&config).await
}
