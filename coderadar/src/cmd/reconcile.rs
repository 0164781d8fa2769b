use crate::{cmd::connect_store, config::Config, modules::reconciler::StatusReconciler};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

#[derive(Debug, Args)]
pub struct ReconcileArgs {}

pub async fn run(_args: ReconcileArgs, config: Config) -> Result<()> {
    let store = connect_store(&config).await?;

    let summary = StatusReconciler::new(store)
        .reconcile(Utc::now())
        .await
        .with_context(|| {
            let message = "Failed to reconcile contest statuses.";
            tracing::error!(message);
            message
        })?;
    tracing::info!(
        "{} contests started, {} contests finished",
        summary.started,
        summary.finished
    );

    Ok(())
}
