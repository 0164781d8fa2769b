use crate::modules::{
    handlers::{ApiError, ValidatedQuery},
    ingestion::{IngestionCoordinator, IngestionError, PlatformReport},
    query::ContestQueryService,
    reconciler::ReconcileSummary,
};
use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::Utc;
use coderadar_libs::{Contest, ContestStatus, Platform, SortOrder};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    str::FromStr,
    sync::Arc,
};
use validator::{Validate, ValidationError};

// Accepted values of the `sort` parameter
static VALID_SORT_OPTIONS: Lazy<HashSet<&str>> =
    Lazy::new(|| HashSet::from(["startTime", "-startTime", "endTime", "name", "-name"]));

/// `all` and an empty value both mean "no filter".
fn parse_filter<T: FromStr>(value: Option<&str>) -> Result<Option<T>, T::Err> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

fn validate_platform(value: &str) -> Result<(), ValidationError> {
    match parse_filter::<Platform>(Some(value)) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid platform")),
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    match parse_filter::<ContestStatus>(Some(value)) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid status")),
    }
}

fn validate_sort_field(value: &str) -> Result<(), ValidationError> {
    if VALID_SORT_OPTIONS.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid sort field"))
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Default)]
pub struct ContestListParameters {
    #[validate(custom = "validate_platform")]
    pub platform: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    #[validate(custom = "validate_sort_field")]
    pub sort: Option<String>,
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
}

impl ContestListParameters {
    fn platform(&self) -> Result<Option<Platform>, ApiError> {
        parse_filter::<Platform>(self.platform.as_deref())
            .map_err(|e| ApiError::InvalidInput(e.to_string()))
    }

    fn status(&self) -> Result<Option<ContestStatus>, ApiError> {
        parse_filter::<ContestStatus>(self.status.as_deref())
            .map_err(|e| ApiError::InvalidInput(e.to_string()))
    }

    fn sort(&self) -> SortOrder {
        self.sort
            .as_deref()
            .and_then(SortOrder::from_param)
            .unwrap_or_default()
    }

    fn keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(String::from)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Default)]
pub struct PlatformParameter {
    #[validate(custom = "validate_platform")]
    pub platform: Option<String>,
}

impl PlatformParameter {
    fn platform(&self) -> Result<Option<Platform>, ApiError> {
        parse_filter::<Platform>(self.platform.as_deref())
            .map_err(|e| ApiError::InvalidInput(e.to_string()))
    }
}

type ContestListResponse = Result<Json<Vec<Contest>>, ApiError>;

pub async fn list_contests(
    ValidatedQuery(params): ValidatedQuery<ContestListParameters>,
    Extension(service): Extension<Arc<ContestQueryService>>,
) -> ContestListResponse {
    let query = service.all(
        params.platform()?,
        params.status()?,
        params.sort(),
        params.keyword(),
        Utc::now(),
    );

    Ok(Json(service.list(&query).await?))
}

pub async fn list_upcoming(
    ValidatedQuery(params): ValidatedQuery<PlatformParameter>,
    Extension(service): Extension<Arc<ContestQueryService>>,
) -> ContestListResponse {
    let query = ContestQueryService::upcoming(params.platform()?, Utc::now());
    Ok(Json(service.list(&query).await?))
}

pub async fn list_ongoing(
    ValidatedQuery(params): ValidatedQuery<PlatformParameter>,
    Extension(service): Extension<Arc<ContestQueryService>>,
) -> ContestListResponse {
    let query = ContestQueryService::ongoing(params.platform()?);
    Ok(Json(service.list(&query).await?))
}

pub async fn list_completed(
    ValidatedQuery(params): ValidatedQuery<PlatformParameter>,
    Extension(service): Extension<Arc<ContestQueryService>>,
) -> ContestListResponse {
    let query = ContestQueryService::completed(params.platform()?);
    Ok(Json(service.list(&query).await?))
}

pub async fn list_platform_contests(
    Path(platform): Path<String>,
    ValidatedQuery(params): ValidatedQuery<ContestListParameters>,
    Extension(service): Extension<Arc<ContestQueryService>>,
) -> ContestListResponse {
    let platform = platform
        .parse::<Platform>()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let query = ContestQueryService::for_platform(
        platform,
        params.status()?,
        params.sort(),
        params.keyword(),
    );
    Ok(Json(service.list(&query).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[serde(flatten)]
    pub platforms: BTreeMap<Platform, PlatformReport>,
    pub contests_processed: usize,
    pub errors: Vec<IngestionError>,
    pub reconciled: ReconcileSummary,
}

pub async fn update_contests(
    Extension(coordinator): Extension<Arc<IngestionCoordinator>>,
) -> Result<Json<UpdateResponse>, ApiError> {
    tracing::info!("Contest update requested");
    let report = coordinator.run().await?;

    Ok(Json(UpdateResponse {
        platforms: report
            .platforms
            .into_iter()
            .map(|platform| (platform.platform, platform))
            .collect(),
        contests_processed: report.contests_processed,
        errors: report.errors,
        reconciled: report.reconciled,
    }))
}
