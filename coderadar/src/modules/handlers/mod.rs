pub mod contest;

use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coderadar_libs::{SharedContestStore, StoreError};
use http::request::Parts;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("unexpected error")]
    StoreError(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(message) => {
                tracing::warn!("invalid request: {}", message);
                StatusCode::BAD_REQUEST
            }
            ApiError::StoreError(e) => {
                tracing::error!("request failed cause: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(MessageResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Query string extractor that rejects unparsable or invalid parameters with 400.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: T = serde_urlencoded::from_str(query).map_err(|rejection| {
            ApiError::InvalidInput(format!("invalid format query string: [{}]", rejection))
        })?;

        value.validate().map_err(|rejection| {
            ApiError::InvalidInput(
                format!("Validation error: [{}]", rejection).replace('\n', ", "),
            )
        })?;

        Ok(ValidatedQuery(value))
    }
}

pub async fn root() -> &'static str {
    "CodeRadar API is running"
}

pub async fn liveness(Extension(store): Extension<SharedContestStore>) -> StatusCode {
    match store.ping().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn readiness(Extension(store): Extension<SharedContestStore>) -> StatusCode {
    match store.count().await {
        Ok(count) if count > 0 => StatusCode::OK,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
