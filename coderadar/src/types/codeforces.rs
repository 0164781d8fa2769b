use serde::Deserialize;
use serde_with::{serde_as, VecSkipError};

/// Envelope returned by `https://codeforces.com/api/contest.list`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct CodeforcesResponse {
    pub status: String,
    pub comment: Option<String>,
    #[serde_as(as = "Option<VecSkipError<_>>")]
    pub result: Option<Vec<CodeforcesContest>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeforcesPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesContest {
    pub id: i64,
    pub name: String,
    pub phase: CodeforcesPhase,
    pub duration_seconds: Option<i64>,
    pub start_time_seconds: Option<i64>,
}
