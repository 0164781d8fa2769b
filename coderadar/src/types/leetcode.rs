use serde::{Deserialize, Serialize};
use serde_with::{serde_as, VecSkipError};

pub const ALL_CONTESTS_QUERY: &str = r#"
{
    allContests {
        title
        titleSlug
        startTime
        duration
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LeetcodeResponse {
    pub data: Option<LeetcodeData>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeData {
    #[serde_as(as = "Option<VecSkipError<_>>")]
    pub all_contests: Option<Vec<LeetcodeContest>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeContest {
    pub title: String,
    pub title_slug: String,
    pub start_time: Option<i64>,
    pub duration: Option<i64>,
}
