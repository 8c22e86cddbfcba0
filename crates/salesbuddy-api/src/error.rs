//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use salesbuddy_core::collaborators::CollaboratorError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("upstream error: {0}")]
  Upstream(#[from] CollaboratorError),

  /// A body, path or query string axum could not extract. Keeps axum's
  /// status (400, 415 or 422).
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

/// Domain validation failures are the caller's fault.
impl From<salesbuddy_core::Error> for ApiError {
  fn from(e: salesbuddy_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store call failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Upstream(e) => {
        tracing::error!(error = %e, "collaborator call failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
      }
      ApiError::Rejected { status, message } => (*status, message.clone()),
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"salesbuddy\""),
      );
    }
    res
  }
}
