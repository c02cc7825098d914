use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use brandsignal_batch::{init_tracing, run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    info!("Brand signal batch starting...");
    run(&cli, Utc::now()).await?;

    Ok(())
}
