use crate::{
    cmd::{build_adapter, TargetPlatform},
    config::Config,
};
use anyhow::Result;
use chrono::Utc;
use clap::Args;

#[derive(Debug, Args)]
pub struct FetchArgs {
    platform: TargetPlatform,
}

/// Print what an adapter would ingest without touching the store.
pub async fn run(args: FetchArgs, config: Config) -> Result<()> {
    let adapter = build_adapter(&config, args.platform.into())?;
    let contests = adapter.fetch_contests(Utc::now()).await;

    tracing::info!("{} contests fetched from {}", contests.len(), args.platform);
    println!("{}", serde_json::to_string_pretty(&contests)?);

    Ok(())
}
