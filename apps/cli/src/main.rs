//! leadloom CLI — multi-source lead deduplication and enrichment engine.
//!
//! Ingests discovery records from scrapers, reconciles them into a single
//! deduplicated lead store, and enriches leads with real contact emails.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
