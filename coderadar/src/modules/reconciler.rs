use chrono::{DateTime, Utc};
use coderadar_libs::{store, ContestStatus, SharedContestStore, StatusTransition};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    /// upcoming -> ongoing
    pub started: u64,
    /// upcoming/ongoing -> completed
    pub finished: u64,
}

/// Advances stored statuses against the wall clock. Never moves a status backwards.
pub struct StatusReconciler {
    store: SharedContestStore,
}

impl StatusReconciler {
    pub fn new(store: SharedContestStore) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, now: DateTime<Utc>) -> store::Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        // A contest that started and ended between two passes goes straight to completed.
        let transitions = [
            (ContestStatus::Upcoming, ContestStatus::Ongoing),
            (ContestStatus::Ongoing, ContestStatus::Completed),
            (ContestStatus::Upcoming, ContestStatus::Completed),
        ];
        for (from, to) in transitions {
            let Some(transition) = StatusTransition::new(from, to, now) else {
                continue;
            };
            let affected = self.store.transition_status(&transition).await?;
            if affected > 0 {
                tracing::info!("{} contests moved from {} to {}", affected, from, to);
            }

            match to {
                ContestStatus::Ongoing => summary.started += affected,
                ContestStatus::Completed => summary.finished += affected,
                ContestStatus::Upcoming => {}
            }
        }

        Ok(summary)
    }
}
