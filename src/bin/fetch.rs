use anyhow::Result;
use clap::{Arg, Command};
use tubedigest::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let command = Command::new("tubedigest-fetch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download audio for a video or playlist URL")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Video or playlist URL")
                .required(true),
        );

    let matches = cli::common_args(command).get_matches();
    let config = cli::setup(&matches)?;

    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| anyhow::anyhow!("missing URL"))?;
    cli::fetch(&config, url).await
}
