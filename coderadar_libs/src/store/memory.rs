use crate::{
    model::{Contest, Platform},
    store::{ContestQuery, ContestStore, Result, SortOrder, StatusTransition, UpsertOutcome},
};
use async_trait::async_trait;
use std::{cmp::Ordering, collections::BTreeMap};
use tokio::sync::RwLock;

/// Contest store kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryContestStore {
    contests: RwLock<BTreeMap<(Platform, String), Contest>>,
}

impl InMemoryContestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Contest> {
        self.contests.read().await.values().cloned().collect()
    }
}

fn compare(sort: SortOrder, a: &Contest, b: &Contest) -> Ordering {
    let primary = match sort {
        SortOrder::StartTimeAsc => a.start_time.cmp(&b.start_time),
        SortOrder::StartTimeDesc => b.start_time.cmp(&a.start_time),
        SortOrder::EndTimeAsc => a.end_time.cmp(&b.end_time),
        SortOrder::NameAsc => a.name.cmp(&b.name),
        SortOrder::NameDesc => b.name.cmp(&a.name),
    };

    primary
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| a.external_id.cmp(&b.external_id))
}

#[async_trait]
impl ContestStore for InMemoryContestStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.contests.read().await.len() as u64)
    }

    async fn upsert(&self, contest: &Contest) -> Result<UpsertOutcome> {
        let mut contests = self.contests.write().await;
        let key = (contest.platform, contest.external_id.clone());

        let outcome = match contests.get(&key) {
            None => UpsertOutcome::Inserted,
            Some(existing) if existing == contest => return Ok(UpsertOutcome::Unchanged),
            Some(_) => UpsertOutcome::Updated,
        };
        contests.insert(key, contest.clone());

        Ok(outcome)
    }

    async fn transition_status(&self, transition: &StatusTransition) -> Result<u64> {
        let mut contests = self.contests.write().await;

        let mut affected = 0;
        for contest in contests
            .values_mut()
            .filter(|contest| transition.matches(contest))
        {
            contest.status = transition.to();
            affected += 1;
        }

        Ok(affected)
    }

    async fn find(&self, query: &ContestQuery) -> Result<Vec<Contest>> {
        let contests = self.contests.read().await;

        let mut found: Vec<Contest> = contests
            .values()
            .filter(|contest| query.matches(contest))
            .cloned()
            .collect();
        found.sort_by(|a, b| compare(query.sort, a, b));
        if let Some(limit) = query.limit {
            found.truncate(limit as usize);
        }

        Ok(found)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::ContestStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn contest(id: &str, name: &str, start: i64, end: i64, status: ContestStatus) -> Contest {
        Contest {
            platform: Platform::Leetcode,
            external_id: String::from(id),
            name: String::from(name),
            url: format!("https://leetcode.com/contest/{}", id),
            start_time: at(start),
            end_time: at(end),
            duration_minutes: (end - start + 30) / 60,
            status,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_and_idempotent() {
        let store = InMemoryContestStore::new();
        let original = contest("weekly-1", "Weekly 1", 0, 5400, ContestStatus::Upcoming);

        assert_eq!(store.upsert(&original).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(&original).await.unwrap(), UpsertOutcome::Unchanged);

        let rescheduled = contest("weekly-1", "Weekly 1 (rescheduled)", 600, 6000, ContestStatus::Upcoming);
        assert_eq!(store.upsert(&rescheduled).await.unwrap(), UpsertOutcome::Updated);

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.snapshot().await, vec![rescheduled]);
    }

    #[tokio::test]
    async fn test_same_external_id_on_other_platform_is_distinct() {
        let store = InMemoryContestStore::new();
        let leetcode = contest("1", "One", 0, 60, ContestStatus::Upcoming);
        let mut codeforces = leetcode.clone();
        codeforces.platform = Platform::Codeforces;

        store.upsert(&leetcode).await.unwrap();
        store.upsert(&codeforces).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_transition_status_updates_matching_records_only() {
        let store = InMemoryContestStore::new();
        store
            .upsert(&contest("a", "A", 0, 100, ContestStatus::Upcoming))
            .await
            .unwrap();
        store
            .upsert(&contest("b", "B", 500, 600, ContestStatus::Upcoming))
            .await
            .unwrap();
        store
            .upsert(&contest("c", "C", 0, 100, ContestStatus::Completed))
            .await
            .unwrap();

        let transition =
            StatusTransition::new(ContestStatus::Upcoming, ContestStatus::Ongoing, at(50)).unwrap();
        assert_eq!(store.transition_status(&transition).await.unwrap(), 1);

        let ongoing = store
            .find(&ContestQuery {
                status: Some(ContestStatus::Ongoing),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ongoing.len(), 1);
        assert_eq!(ongoing[0].external_id, "a");
    }

    #[tokio::test]
    async fn test_find_sorts_and_limits() {
        let store = InMemoryContestStore::new();
        for (id, name, start) in [("x", "Biweekly", 300), ("y", "Alpha", 100), ("z", "Weekly", 200)] {
            store
                .upsert(&contest(id, name, start, start + 60, ContestStatus::Completed))
                .await
                .unwrap();
        }

        let by_start_desc = store
            .find(&ContestQuery {
                sort: SortOrder::StartTimeDesc,
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<&str> = by_start_desc.iter().map(|c| c.external_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "z"]);

        let by_name = store
            .find(&ContestQuery {
                sort: SortOrder::NameAsc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = by_name.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Biweekly", "Weekly"]);
    }

    #[tokio::test]
    async fn test_find_sorts_names_by_byte_order() {
        let store = InMemoryContestStore::new();
        for (id, name) in [("a", "alpha"), ("b", "Zeta"), ("c", "beta")] {
            store
                .upsert(&contest(id, name, 0, 60, ContestStatus::Completed))
                .await
                .unwrap();
        }

        let by_name = store
            .find(&ContestQuery {
                sort: SortOrder::NameDesc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = by_name.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["beta", "alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_find_empty_store() {
        let store = InMemoryContestStore::new();
        let found = store.find(&ContestQuery::default()).await.unwrap();
        assert!(found.is_empty());
    }
}
