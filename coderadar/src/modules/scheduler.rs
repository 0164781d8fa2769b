use crate::modules::ingestion::IngestionCoordinator;
use std::sync::Arc;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};

/// Runs the ingestion once at start and then at a fixed period until shutdown.
pub struct Scheduler {
    coordinator: Arc<IngestionCoordinator>,
    period: Duration,
}

impl Scheduler {
    pub fn new(coordinator: Arc<IngestionCoordinator>, period: Duration) -> Self {
        Self {
            coordinator,
            period,
        }
    }

    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                "Contest ingestion scheduled every {} minutes",
                self.period.as_secs() / 60
            );
            let mut interval = time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown.changed() => break,
                }

                // Shutdown cancels a run in progress; the next start picks it up again.
                tokio::select! {
                    _ = self.tick() => {}
                    _ = shutdown.changed() => break,
                }
            }

            tracing::info!("Contest ingestion scheduler stopped");
        })
    }

    async fn tick(&self) {
        tracing::info!("Running scheduled task to fetch contests");
        match self.coordinator.try_run().await {
            Some(Ok(report)) => tracing::info!(
                "Scheduled ingestion finished: {} contests processed, {} platform errors",
                report.contests_processed,
                report.errors.len()
            ),
            Some(Err(e)) => tracing::error!("Scheduled ingestion failed: {:?}", e),
            None => tracing::warn!("Previous ingestion is still running, skip this tick"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::modules::{ingestion::test::StaticAdapter, platforms::ContestAdapter};
    use coderadar_libs::{ContestStore, InMemoryContestStore, Platform};
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn test_runs_at_start_and_every_period() {
        let store = Arc::new(InMemoryContestStore::new());
        let adapter = StaticAdapter::new(Platform::Leetcode, vec![("weekly-1", "Weekly 1", 0, 5400)]);
        let calls = adapter.calls.clone();
        let coordinator = Arc::new(IngestionCoordinator::new(
            store.clone(),
            vec![Box::new(adapter) as Box<dyn ContestAdapter>],
        ));

        let (tx, rx) = watch::channel(false);
        let handle = Scheduler::new(coordinator, Duration::from_secs(30 * 60)).spawn(rx);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.count().await.unwrap(), 1);

        time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
