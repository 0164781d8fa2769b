pub mod crawl;
pub mod fetch;
pub mod reconcile;
pub mod server;

use crate::{
    config::Config,
    modules::platforms::{build_client, CodeforcesAdapter, ContestAdapter, LeetcodeAdapter},
};
use anyhow::{Context, Result};
use clap::ValueEnum;
use coderadar_libs::{PgContestStore, Platform};
use std::{fmt, sync::Arc};

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum TargetPlatform {
    Codeforces,
    Leetcode,
}

impl From<TargetPlatform> for Platform {
    fn from(target: TargetPlatform) -> Self {
        match target {
            TargetPlatform::Codeforces => Platform::Codeforces,
            TargetPlatform::Leetcode => Platform::Leetcode,
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Platform::from(*self))
    }
}

/// Connect to PostgreSQL and apply pending migrations.
pub async fn connect_store(config: &Config) -> Result<Arc<PgContestStore>> {
    let database_url = config.database_url()?;

    let store = PgContestStore::connect(database_url, config.database_max_connections)
        .await
        .with_context(|| {
            let message = "Failed to create database connection pool.";
            tracing::error!(message);
            message
        })?;
    store.migrate().await.with_context(|| {
        let message = "Failed to run database migration.";
        tracing::error!(message);
        message
    })?;

    Ok(Arc::new(store))
}

pub fn build_adapter(config: &Config, platform: Platform) -> Result<Box<dyn ContestAdapter>> {
    let client = build_client(config.http_timeout).with_context(|| {
        let message = "Failed to build HTTP client.";
        tracing::error!(message);
        message
    })?;

    let adapter: Box<dyn ContestAdapter> = match platform {
        Platform::Codeforces => Box::new(CodeforcesAdapter::new(
            config.codeforces_api_url.clone(),
            client,
            config.codeforces_include_finished,
        )),
        Platform::Leetcode => Box::new(LeetcodeAdapter::new(
            config.leetcode_graphql_url.clone(),
            client,
        )),
    };

    Ok(adapter)
}

pub fn build_adapters(config: &Config) -> Result<Vec<Box<dyn ContestAdapter>>> {
    Platform::ALL
        .into_iter()
        .map(|platform| build_adapter(config, platform))
        .collect()
}
