pub mod memory;
pub mod postgres;

use crate::model::{derive_status, Contest, ContestStatus, Platform};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use memory::InMemoryContestStore;
pub use postgres::{PgContestStore, MIGRATOR};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to execute query")]
    QueryError(#[from] sqlx::Error),
    #[error("failed to run migration")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("corrupted record: {0}")]
    CorruptedRecord(String),
}

/// Result of an upsert keyed by `(platform, external_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// A forward move of the contest lifecycle, applied to every record that is in
/// state `from` and whose schedule classifies as `to` at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    from: ContestStatus,
    to: ContestStatus,
    now: DateTime<Utc>,
}

impl StatusTransition {
    /// Returns `None` for transitions that would not advance the lifecycle.
    pub fn new(from: ContestStatus, to: ContestStatus, now: DateTime<Utc>) -> Option<Self> {
        if to > from {
            Some(Self { from, to, now })
        } else {
            None
        }
    }

    pub fn from(&self) -> ContestStatus {
        self.from
    }

    pub fn to(&self) -> ContestStatus {
        self.to
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn matches(&self, contest: &Contest) -> bool {
        contest.status == self.from
            && derive_status(self.now, contest.start_time, contest.end_time) == self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortOrder {
    #[default]
    StartTimeAsc,
    StartTimeDesc,
    EndTimeAsc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Parse the `sort` query parameter. A leading `-` means descending.
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "startTime" => Some(SortOrder::StartTimeAsc),
            "-startTime" => Some(SortOrder::StartTimeDesc),
            "endTime" => Some(SortOrder::EndTimeAsc),
            "name" => Some(SortOrder::NameAsc),
            "-name" => Some(SortOrder::NameDesc),
            _ => None,
        }
    }
}

/// Filter, order and cap applied by [`ContestStore::find`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContestQuery {
    pub platform: Option<Platform>,
    pub status: Option<ContestStatus>,
    /// Exclusive lower bound on `start_time`.
    pub starts_after: Option<DateTime<Utc>>,
    /// Inclusive lower bound on `start_time`.
    pub starts_since: Option<DateTime<Utc>>,
    /// Case-insensitive substring of `name`. Case folding of non-ASCII letters
    /// follows the backing store (`ILIKE` in PostgreSQL).
    pub keyword: Option<String>,
    pub sort: SortOrder,
    pub limit: Option<u32>,
}

impl ContestQuery {
    pub fn matches(&self, contest: &Contest) -> bool {
        if self.platform.is_some_and(|platform| platform != contest.platform) {
            return false;
        }
        if self.status.is_some_and(|status| status != contest.status) {
            return false;
        }
        if self
            .starts_after
            .is_some_and(|after| contest.start_time <= after)
        {
            return false;
        }
        if self
            .starts_since
            .is_some_and(|since| contest.start_time < since)
        {
            return false;
        }
        if let Some(keyword) = &self.keyword {
            if !contest
                .name
                .to_lowercase()
                .contains(&keyword.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}

#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn count(&self) -> Result<u64>;
    async fn upsert(&self, contest: &Contest) -> Result<UpsertOutcome>;
    async fn transition_status(&self, transition: &StatusTransition) -> Result<u64>;
    async fn find(&self, query: &ContestQuery) -> Result<Vec<Contest>>;
}

pub type SharedContestStore = Arc<dyn ContestStore>;

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn contest(status: ContestStatus) -> Contest {
        Contest {
            platform: Platform::Codeforces,
            external_id: String::from("1"),
            name: String::from("Codeforces Round #1 (Div. 2)"),
            url: String::from("https://codeforces.com/contest/1"),
            start_time: at(1000),
            end_time: at(2000),
            duration_minutes: 17,
            status,
        }
    }

    #[test]
    fn test_backward_transition_is_rejected() {
        assert!(StatusTransition::new(ContestStatus::Completed, ContestStatus::Ongoing, at(0)).is_none());
        assert!(StatusTransition::new(ContestStatus::Ongoing, ContestStatus::Ongoing, at(0)).is_none());
        assert!(StatusTransition::new(ContestStatus::Upcoming, ContestStatus::Completed, at(0)).is_some());
    }

    #[test]
    fn test_transition_matches_source_state_and_schedule() {
        let transition =
            StatusTransition::new(ContestStatus::Upcoming, ContestStatus::Ongoing, at(1000)).unwrap();

        assert!(transition.matches(&contest(ContestStatus::Upcoming)));
        assert!(!transition.matches(&contest(ContestStatus::Ongoing)));

        let late =
            StatusTransition::new(ContestStatus::Upcoming, ContestStatus::Ongoing, at(2000)).unwrap();
        assert!(!late.matches(&contest(ContestStatus::Upcoming)));
    }

    #[test]
    fn test_query_matches() {
        let target = contest(ContestStatus::Upcoming);

        let query = ContestQuery {
            platform: Some(Platform::Codeforces),
            keyword: Some(String::from("div. 2")),
            ..Default::default()
        };
        assert!(query.matches(&target));

        let query = ContestQuery {
            starts_after: Some(at(1000)),
            ..Default::default()
        };
        assert!(!query.matches(&target));

        let query = ContestQuery {
            starts_since: Some(at(1000)),
            ..Default::default()
        };
        assert!(query.matches(&target));

        let query = ContestQuery {
            status: Some(ContestStatus::Completed),
            ..Default::default()
        };
        assert!(!query.matches(&target));
    }

    #[test]
    fn test_sort_param() {
        assert_eq!(SortOrder::from_param("-startTime"), Some(SortOrder::StartTimeDesc));
        assert_eq!(SortOrder::from_param("name"), Some(SortOrder::NameAsc));
        assert_eq!(SortOrder::from_param("score"), None);
    }
}
