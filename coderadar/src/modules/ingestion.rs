use crate::modules::{
    platforms::ContestAdapter,
    reconciler::{ReconcileSummary, StatusReconciler},
};
use chrono::{DateTime, Utc};
use coderadar_libs::{store, Platform, SharedContestStore, UpsertOutcome};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformReport {
    pub platform: Platform,
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl PlatformReport {
    fn new(platform: Platform) -> Self {
        Self {
            platform,
            fetched: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionError {
    pub platform: Platform,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub contests_processed: usize,
    pub platforms: Vec<PlatformReport>,
    pub errors: Vec<IngestionError>,
    pub reconciled: ReconcileSummary,
}

/// Runs every adapter, upserts what they return and reconciles statuses afterwards.
pub struct IngestionCoordinator {
    store: SharedContestStore,
    adapters: Vec<Box<dyn ContestAdapter>>,
    reconciler: StatusReconciler,
    in_flight: Mutex<()>,
}

impl IngestionCoordinator {
    pub fn new(store: SharedContestStore, adapters: Vec<Box<dyn ContestAdapter>>) -> Self {
        let reconciler = StatusReconciler::new(store.clone());
        Self {
            store,
            adapters,
            reconciler,
            in_flight: Mutex::new(()),
        }
    }

    /// Run once, waiting for an in-flight run to finish first.
    pub async fn run(&self) -> store::Result<IngestionReport> {
        let _guard = self.in_flight.lock().await;
        self.run_at(Utc::now()).await
    }

    /// Run once unless another run is in flight, in which case `None` is returned.
    pub async fn try_run(&self) -> Option<store::Result<IngestionReport>> {
        let _guard = self.in_flight.try_lock().ok()?;
        Some(self.run_at(Utc::now()).await)
    }

    /// Fetch every platform, save the results and advance stored statuses as of `now`.
    ///
    /// A platform that fails to fetch counts as zero contests and the others carry on.
    async fn run_at(&self, now: DateTime<Utc>) -> store::Result<IngestionReport> {
        tracing::info!("Start to ingest contests from {} platforms.", self.adapters.len());

        let fetched = join_all(self.adapters.iter().map(|adapter| async move {
            (adapter.platform(), adapter.try_fetch_contests(now).await)
        }))
        .await;

        let mut platforms = Vec::with_capacity(fetched.len());
        let mut errors = Vec::new();
        let mut contests_processed = 0;

        for (platform, result) in fetched {
            let mut report = PlatformReport::new(platform);

            let contests = match result {
                Ok(contests) => contests,
                Err(e) => {
                    tracing::error!("failed to fetch contests from {}: {}", platform, e);
                    errors.push(IngestionError {
                        platform,
                        message: e.to_string(),
                    });
                    Vec::new()
                }
            };
            report.fetched = contests.len();

            for contest in contests.iter() {
                let outcome = self.store.upsert(contest).await.map_err(|e| {
                    tracing::error!("an error occurred at saving {:?}: {:?}", contest.key(), e);
                    e
                })?;
                match outcome {
                    UpsertOutcome::Inserted => report.inserted += 1,
                    UpsertOutcome::Updated => report.updated += 1,
                    UpsertOutcome::Unchanged => report.unchanged += 1,
                }
                contests_processed += 1;
            }

            tracing::info!(
                "{} contests from {} saved (inserted={} updated={} unchanged={}).",
                report.fetched,
                platform,
                report.inserted,
                report.updated,
                report.unchanged
            );
            platforms.push(report);
        }

        let reconciled = self.reconciler.reconcile(now).await?;

        Ok(IngestionReport {
            contests_processed,
            platforms,
            errors,
            reconciled,
        })
    }
}
