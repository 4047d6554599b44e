mod auth;
mod cli;
mod concurrency;
mod config;
mod context;
mod error;
mod orchestrator;
mod output;
mod pipeline;
mod providers;
mod replay;
mod workflow;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting benchgate");
    cli.execute().await?;

    Ok(())
}
