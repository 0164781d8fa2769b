use crate::{
    cmd::{build_adapters, connect_store},
    config::Config,
    modules::ingestion::IngestionCoordinator,
};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct CrawlArgs {}

pub async fn run(_args: CrawlArgs, config: Config) -> Result<()> {
    let store = connect_store(&config).await?;
    let coordinator = IngestionCoordinator::new(store, build_adapters(&config)?);

    let report = coordinator.run().await.with_context(|| {
        let message = "Failed to ingest contests.";
        tracing::error!(message);
        message
    })?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
