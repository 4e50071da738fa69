use anyhow::Context as _;
use clap::Parser as _;
use guardpost::{setup_logging, App, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging()?;

    let args = Args::parse();

    let data_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => dirs::data_local_dir()
            .map(|dir| dir.join("guardpost"))
            .context("failed to determine the data directory")?,
    };

    App::run_until_completion(args, data_dir).await
}
