pub mod codeforces;
pub mod leetcode;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coderadar_libs::{Contest, Platform};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub use codeforces::CodeforcesAdapter;
pub use leetcode::LeetcodeAdapter;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to request to upstream: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("upstream reported failure: {0}")]
    UpstreamError(String),
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

/// Translates one platform's contest listing into canonical records.
#[async_trait]
pub trait ContestAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    async fn try_fetch_contests(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, AdapterError>;

    /// Fetch contests, degrading to an empty list on any failure so that one
    /// platform's outage never blocks the other.
    async fn fetch_contests(&self, now: DateTime<Utc>) -> Vec<Contest> {
        match self.try_fetch_contests(now).await {
            Ok(contests) => contests,
            Err(e) => {
                tracing::error!("failed to fetch contests from {}: {}", self.platform(), e);
                Vec::new()
            }
        }
    }
}

/// HTTP client shared by every adapter.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .gzip(true)
        .timeout(timeout)
        .user_agent(concat!("coderadar/", env!("CARGO_PKG_VERSION")))
        .build()
}
