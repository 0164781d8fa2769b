use crate::{
    modules::platforms::{AdapterError, ContestAdapter},
    types::codeforces::{CodeforcesContest, CodeforcesPhase, CodeforcesResponse},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coderadar_libs::{Contest, Platform};
use reqwest::{Client, Url};

pub const DEFAULT_API_URL: &str = "https://codeforces.com/api/contest.list";

pub struct CodeforcesAdapter {
    url: Url,
    client: Client,
    include_finished: bool,
}

impl CodeforcesAdapter {
    pub fn new(url: Url, client: Client, include_finished: bool) -> Self {
        CodeforcesAdapter {
            url,
            client,
            include_finished,
        }
    }

    /// Map Codeforces contests onto the canonical model.
    ///
    /// Contests without a start time or duration are left out.
    pub fn map_contests(&self, contests: Vec<CodeforcesContest>, now: DateTime<Utc>) -> Vec<Contest> {
        contests
            .into_iter()
            .filter(|contest| self.include_finished || contest.phase != CodeforcesPhase::Finished)
            .filter_map(|contest| to_contest(contest, now))
            .collect()
    }
}

fn to_contest(contest: CodeforcesContest, now: DateTime<Utc>) -> Option<Contest> {
    let (Some(start), Some(duration)) = (contest.start_time_seconds, contest.duration_seconds) else {
        tracing::debug!("skip Codeforces contest {} without schedule", contest.id);
        return None;
    };

    let mapped = Contest::scheduled(
        Platform::Codeforces,
        contest.id.to_string(),
        contest.name,
        format!("https://codeforces.com/contest/{}", contest.id),
        start,
        duration,
        now,
    );
    if mapped.is_none() {
        tracing::debug!("skip Codeforces contest {} with invalid schedule", contest.id);
    }

    mapped
}

#[async_trait]
impl ContestAdapter for CodeforcesAdapter {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    async fn try_fetch_contests(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, AdapterError> {
        tracing::info!("Start to retrieve contests information from Codeforces");
        let res = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body: CodeforcesResponse = res.json().await?;

        if body.status != "OK" {
            return Err(AdapterError::UpstreamError(
                body.comment.unwrap_or(body.status),
            ));
        }
        let result = body.result.ok_or_else(|| {
            AdapterError::MalformedResponse(String::from("`result` is missing"))
        })?;

        let contests = self.map_contests(result, now);
        tracing::info!(
            "{} contests information successfully retrieved from Codeforces.",
            contests.len()
        );

        Ok(contests)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use coderadar_libs::ContestStatus;

    fn adapter(include_finished: bool) -> CodeforcesAdapter {
        CodeforcesAdapter::new(
            Url::parse(DEFAULT_API_URL).unwrap(),
            Client::new(),
            include_finished,
        )
    }

    fn response() -> CodeforcesResponse {
        serde_json::from_str(
            r#"{
                "status": "OK",
                "result": [
                    {"id": 1900, "name": "Codeforces Round 900 (Div. 1)", "type": "CF", "phase": "BEFORE", "frozen": false, "durationSeconds": 7200, "startTimeSeconds": 1000, "relativeTimeSeconds": -100},
                    {"id": 1899, "name": "Educational Round", "type": "ICPC", "phase": "CODING", "frozen": false, "durationSeconds": 7200, "startTimeSeconds": 0},
                    {"id": 1898, "name": "Old Round", "type": "CF", "phase": "FINISHED", "frozen": false, "durationSeconds": 7200, "startTimeSeconds": 0},
                    {"id": 1897, "name": "Unscheduled", "type": "CF", "phase": "BEFORE", "frozen": false, "durationSeconds": 7200},
                    {"id": "broken", "phase": "BEFORE"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_skips_malformed_entries() {
        let result = response().result.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0].phase, CodeforcesPhase::Before);
        assert_eq!(result[2].phase, CodeforcesPhase::Finished);
    }

    #[test]
    fn test_map_contests() {
        let now = Utc.timestamp_opt(500, 0).unwrap();
        let contests = adapter(false).map_contests(response().result.unwrap(), now);

        assert_eq!(contests.len(), 2);

        let round = &contests[0];
        assert_eq!(round.platform, Platform::Codeforces);
        assert_eq!(round.external_id, "1900");
        assert_eq!(round.url, "https://codeforces.com/contest/1900");
        assert_eq!(round.start_time.timestamp_millis(), 1_000_000);
        assert_eq!(round.end_time.timestamp_millis(), 8_200_000);
        assert_eq!(round.duration_minutes, 120);
        assert_eq!(round.status, ContestStatus::Upcoming);

        assert_eq!(contests[1].external_id, "1899");
        assert_eq!(contests[1].status, ContestStatus::Ongoing);
    }

    #[test]
    fn test_map_contests_with_finished() {
        let now = Utc.timestamp_opt(10_000, 0).unwrap();
        let contests = adapter(true).map_contests(response().result.unwrap(), now);

        assert_eq!(contests.len(), 3);
        assert!(contests[1..]
            .iter()
            .all(|contest| contest.status == ContestStatus::Completed));
    }

    #[test]
    fn test_failed_envelope() {
        let body: CodeforcesResponse = serde_json::from_str(
            r#"{"status": "FAILED", "comment": "Call limit exceeded"}"#,
        )
        .unwrap();

        assert_eq!(body.status, "FAILED");
        assert_eq!(body.comment.as_deref(), Some("Call limit exceeded"));
        assert!(body.result.is_none());
    }
}
