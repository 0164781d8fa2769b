use crate::{
    modules::platforms::{AdapterError, ContestAdapter},
    types::leetcode::{
        GraphqlError, GraphqlRequest, LeetcodeContest, LeetcodeResponse, ALL_CONTESTS_QUERY,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coderadar_libs::{Contest, Platform};
use reqwest::{Client, Url};

pub const DEFAULT_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

pub struct LeetcodeAdapter {
    url: Url,
    client: Client,
}

impl LeetcodeAdapter {
    pub fn new(url: Url, client: Client) -> Self {
        LeetcodeAdapter { url, client }
    }

    /// Map LeetCode contests onto the canonical model.
    pub fn map_contests(contests: Vec<LeetcodeContest>, now: DateTime<Utc>) -> Vec<Contest> {
        contests
            .into_iter()
            .filter_map(|contest| to_contest(contest, now))
            .collect()
    }
}

fn to_contest(contest: LeetcodeContest, now: DateTime<Utc>) -> Option<Contest> {
    let (Some(start), Some(duration)) = (contest.start_time, contest.duration) else {
        tracing::debug!("skip LeetCode contest {} without schedule", contest.title_slug);
        return None;
    };

    let url = format!("https://leetcode.com/contest/{}", contest.title_slug);
    let mapped = Contest::scheduled(
        Platform::Leetcode,
        contest.title_slug.clone(),
        contest.title,
        url,
        start,
        duration,
        now,
    );
    if mapped.is_none() {
        tracing::debug!("skip LeetCode contest {} with invalid schedule", contest.title_slug);
    }

    mapped
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl ContestAdapter for LeetcodeAdapter {
    fn platform(&self) -> Platform {
        Platform::Leetcode
    }

    async fn try_fetch_contests(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, AdapterError> {
        tracing::info!("Start to retrieve contests information from LeetCode");
        let res = self
            .client
            .post(self.url.clone())
            .json(&GraphqlRequest {
                query: ALL_CONTESTS_QUERY,
            })
            .send()
            .await?
            .error_for_status()?;
        let body: LeetcodeResponse = res.json().await?;

        if !body.errors.is_empty() {
            return Err(AdapterError::UpstreamError(join_messages(&body.errors)));
        }
        let contests = body
            .data
            .and_then(|data| data.all_contests)
            .ok_or_else(|| {
                AdapterError::MalformedResponse(String::from("`data.allContests` is missing"))
            })?;

        let contests = Self::map_contests(contests, now);
        tracing::info!(
            "{} contests information successfully retrieved from LeetCode.",
            contests.len()
        );

        Ok(contests)
    }
}
