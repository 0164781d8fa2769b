use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error returned when a platform or status string is not one of the recognized values.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Codeforces,
    Leetcode,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Codeforces, Platform::Leetcode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::Leetcode => "leetcode",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    // Upstream variants used both "Codeforces"/"LeetCode" and lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codeforces" => Ok(Platform::Codeforces),
            "leetcode" => Ok(Platform::Leetcode),
            _ => Err(UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a contest. The declaration order is the lifecycle order,
/// so `Upcoming < Ongoing < Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ContestStatus {
    pub const ALL: [ContestStatus; 3] = [
        ContestStatus::Upcoming,
        ContestStatus::Ongoing,
        ContestStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Upcoming => "upcoming",
            ContestStatus::Ongoing => "ongoing",
            ContestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(ContestStatus::Upcoming),
            "ongoing" => Ok(ContestStatus::Ongoing),
            "completed" => Ok(ContestStatus::Completed),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Classify a contest against the wall clock.
///
/// The start is inclusive and the end is exclusive: at `now == start` the contest
/// is ongoing, at `now == end` it is completed.
pub fn derive_status(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ContestStatus {
    if now < start {
        ContestStatus::Upcoming
    } else if now < end {
        ContestStatus::Ongoing
    } else {
        ContestStatus::Completed
    }
}

/// Platform-agnostic contest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub platform: Platform,
    pub external_id: String,
    pub name: String,
    pub url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: ContestStatus,
}

impl Contest {
    /// Build a record from an upstream schedule given in epoch seconds.
    ///
    /// Returns `None` when the duration is not positive or the timestamps fall
    /// outside the representable range, so that `end_time > start_time` always holds.
    pub fn scheduled(
        platform: Platform,
        external_id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        start_seconds: i64,
        duration_seconds: i64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if duration_seconds <= 0 {
            return None;
        }

        let start_millis = start_seconds.checked_mul(1000)?;
        let end_millis = start_millis.checked_add(duration_seconds.checked_mul(1000)?)?;
        let start_time = Utc.timestamp_millis_opt(start_millis).single()?;
        let end_time = Utc.timestamp_millis_opt(end_millis).single()?;

        Some(Contest {
            platform,
            external_id: external_id.into(),
            name: name.into(),
            url: url.into(),
            start_time,
            end_time,
            duration_minutes: (duration_seconds + 30) / 60,
            status: derive_status(now, start_time, end_time),
        })
    }

    /// Identity key used for upserts.
    pub fn key(&self) -> (Platform, &str) {
        (self.platform, self.external_id.as_str())
    }
}
