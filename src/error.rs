//! Error taxonomy for the service.
//!
//! Only `Validation` ever reaches a client with its message. Everything else is
//! logged with its cause and answered with a generic server error. `ModelError`
//! never reaches the transport at all: the counselor turns it into a fallback reply.

use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Structural problems in a questionnaire catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
  #[error("catalog contains no questions")]
  Empty,
  #[error("question '{0}' has no options")]
  NoOptions(String),
  #[error("question '{0}' option values are not a contiguous range starting at 0")]
  NonContiguous(String),
  #[error("question '{id}' has max value {found}, expected {expected} like the rest of the catalog")]
  MixedRanges { id: String, expected: i64, found: i64 },
  #[error("question id '{0}' appears more than once")]
  DuplicateId(String),
}

/// Failure of the hosted language model (or of reaching it).
#[derive(Debug, Error)]
pub enum ModelError {
  #[error("model backend is not configured")]
  NotConfigured,
  #[error("transport error: {0}")]
  Transport(String),
  #[error("model call timed out after {0:?}")]
  Timeout(Duration),
  #[error("model HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("malformed model response: {0}")]
  Malformed(String),
}

impl ModelError {
  /// `limit` is the client timeout, so a reqwest timeout reads the same as the counselor's.
  pub fn from_reqwest(e: reqwest::Error, limit: Duration) -> Self {
    if e.is_timeout() {
      ModelError::Timeout(limit)
    } else if e.is_decode() {
      ModelError::Malformed(e.to_string())
    } else {
      ModelError::Transport(e.to_string())
    }
  }
}

/// Computation defect in the assessment engine. Never retried.
#[derive(Debug, Error)]
pub enum AssessmentFailure {
  #[error("catalog cannot be scored: {0}")]
  Catalog(#[from] CatalogError),
  #[error("answer sum overflowed")]
  Overflow,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("configuration error: {0}")]
  Configuration(String),
  #[error("{0}")]
  Validation(String),
  #[error("assessment failed")]
  Assessment(#[source] AssessmentFailure),
}

impl From<AssessmentFailure> for AppError {
  fn from(e: AssessmentFailure) -> Self {
    AppError::Assessment(e)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> axum::response::Response {
    let (status, detail) = match &self {
      AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
      AppError::Assessment(cause) => {
        error!(target: "assessment", error = %cause, "Assessment failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process assessment".to_string())
      }
      AppError::Configuration(cause) => {
        error!(target: "gamcounsel", error = %cause, "Configuration error reached the transport");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
      }
    };
    (status, Json(json!({ "detail": detail }))).into_response()
  }
}
