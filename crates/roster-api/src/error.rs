//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::ValidationError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Validation(ValidationError),

  /// The body was not a JSON object, or not JSON at all.
  #[error(transparent)]
  Body(#[from] JsonRejection),

  #[error("storage unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error through the core taxonomy.
  pub fn from_store<E: Into<roster_core::Error>>(e: E) -> Self { Self::from(e.into()) }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error;
    match e {
      Error::Validation(v) => Self::Validation(v),
      Error::NotFound(id) => Self::NotFound(format!("person {id} not found")),
      Error::StorageUnavailable(source) => Self::Unavailable(source),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(v) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": v.to_string(), "fields": v.violations() })),
      )
        .into_response(),
      ApiError::Body(rejection) => {
        (rejection.status(), Json(json!({ "error": rejection.body_text() })))
          .into_response()
      }
      ApiError::Unavailable(e) => (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": format!("storage unavailable: {e}") })),
      )
        .into_response(),
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
