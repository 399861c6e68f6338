//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use educards_core::AggregationError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Aggregation(#[from] AggregationError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Aggregation(AggregationError::WriteConflict { .. }) => StatusCode::CONFLICT,
      ApiError::Aggregation(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) => m,
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
