use chrono::{DateTime, Duration, Utc};
use coderadar_libs::{
    store, Contest, ContestQuery, ContestStatus, Platform, SharedContestStore, SortOrder,
};
use tokio::time::Instant;

/// Maximum number of records returned by the completed-contests view.
pub const COMPLETED_LIMIT: u32 = 50;

/// Read side of the contest store.
pub struct ContestQueryService {
    store: SharedContestStore,
    all_view_window: Duration,
}

impl ContestQueryService {
    pub fn new(store: SharedContestStore, all_view_window: Duration) -> Self {
        Self {
            store,
            all_view_window,
        }
    }

    pub async fn list(&self, query: &ContestQuery) -> store::Result<Vec<Contest>> {
        let start_process = Instant::now();
        let contests = self.store.find(query).await?;
        let time = Instant::now().duration_since(start_process).as_millis();

        tracing::info!(
            target: "querylog",
            "elapsed_time={} hits={} params={}",
            time,
            contests.len(),
            serde_json::to_string(query).unwrap_or_default()
        );

        Ok(contests)
    }

    /// Contests that started within the configured window, plus everything after it.
    /// A window reaching past the earliest representable time is unbounded.
    pub fn all(
        &self,
        platform: Option<Platform>,
        status: Option<ContestStatus>,
        sort: SortOrder,
        keyword: Option<String>,
        now: DateTime<Utc>,
    ) -> ContestQuery {
        ContestQuery {
            platform,
            status,
            starts_since: now.checked_sub_signed(self.all_view_window),
            keyword,
            sort,
            ..Default::default()
        }
    }

    pub fn upcoming(platform: Option<Platform>, now: DateTime<Utc>) -> ContestQuery {
        ContestQuery {
            platform,
            status: Some(ContestStatus::Upcoming),
            starts_after: Some(now),
            sort: SortOrder::StartTimeAsc,
            ..Default::default()
        }
    }

    pub fn ongoing(platform: Option<Platform>) -> ContestQuery {
        ContestQuery {
            platform,
            status: Some(ContestStatus::Ongoing),
            sort: SortOrder::EndTimeAsc,
            ..Default::default()
        }
    }

    pub fn completed(platform: Option<Platform>) -> ContestQuery {
        ContestQuery {
            platform,
            status: Some(ContestStatus::Completed),
            sort: SortOrder::StartTimeDesc,
            limit: Some(COMPLETED_LIMIT),
            ..Default::default()
        }
    }

    pub fn for_platform(
        platform: Platform,
        status: Option<ContestStatus>,
        sort: SortOrder,
        keyword: Option<String>,
    ) -> ContestQuery {
        ContestQuery {
            platform: Some(platform),
            status,
            keyword,
            sort,
            ..Default::default()
        }
    }
}
