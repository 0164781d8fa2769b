use crate::modules::platforms::{codeforces, leetcode};
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use reqwest::Url;
use std::{env, fmt::Display, str::FromStr, time::Duration};

/// Settings read from the environment (and `.env`, loaded in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub update_interval: Duration,
    pub http_timeout: Duration,
    pub codeforces_api_url: Url,
    pub leetcode_graphql_url: Url,
    pub codeforces_include_finished: bool,
    pub all_view_window: chrono::Duration,
    pub frontend_origin: Option<HeaderValue>,
}

fn load<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        tracing::warn!(
            "{} environment variable is not set. Default value `{}` will be used.",
            key,
            default
        );
        String::from(default)
    });

    value.parse::<T>().map_err(|e| {
        let message = format!("invalid value `{}` for {}: {}", value, key, e);
        tracing::error!(message);
        anyhow::anyhow!(message)
    })
}

/// Scheduler period, at least one minute.
fn update_interval(minutes: u64) -> Result<Duration> {
    minutes
        .max(1)
        .checked_mul(60)
        .map(Duration::from_secs)
        .with_context(|| {
            let message = format!("UPDATE_INTERVAL_MINUTES `{}` is too large", minutes);
            tracing::error!(message);
            message
        })
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let frontend_origin = match env::var("FRONTEND_ORIGIN_URL") {
            Ok(origin) => Some(origin.parse::<HeaderValue>().with_context(|| {
                let message = format!("FRONTEND_ORIGIN_URL `{}` is not a valid origin", origin);
                tracing::error!(message);
                message
            })?),
            Err(_) => None,
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL").ok(),
            database_max_connections: load("DATABASE_MAX_CONNECTIONS", "5")?,
            port: load("PORT", "5000")?,
            update_interval: update_interval(load("UPDATE_INTERVAL_MINUTES", "180")?)?,
            http_timeout: Duration::from_secs(load("HTTP_TIMEOUT_SECS", "10")?),
            codeforces_api_url: load("CODEFORCES_API_URL", codeforces::DEFAULT_API_URL)?,
            leetcode_graphql_url: load("LEETCODE_GRAPHQL_URL", leetcode::DEFAULT_GRAPHQL_URL)?,
            codeforces_include_finished: load("CODEFORCES_INCLUDE_FINISHED", "false")?,
            all_view_window: chrono::Duration::days(
                load::<u32>("ALL_VIEW_WINDOW_DAYS", "365")?.into(),
            ),
            frontend_origin,
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            let message = "DATABASE_URL must be configured.";
            tracing::error!(message);
            message
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_falls_back_to_default() {
        let port: u16 = load("CODERADAR_TEST_UNSET_PORT", "5000").unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_load_rejects_invalid_value() {
        assert!(load::<u16>("CODERADAR_TEST_UNSET_PORT", "not-a-port").is_err());
    }

    #[test]
    fn test_update_interval() {
        assert_eq!(update_interval(180).unwrap(), Duration::from_secs(180 * 60));
        assert_eq!(update_interval(0).unwrap(), Duration::from_secs(60));
        assert!(update_interval(u64::MAX).is_err());
    }
}
