//! Store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected by domain validation before it reached SQL.
  #[error("invalid input: {0}")]
  Core(#[from] salesbuddy_core::Error),

  /// SQLite failures, including constraint violations such as a dangling
  /// lead id.
  #[error("sqlite: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("activity data: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed id in row: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("malformed timestamp in row: {0}")]
  DateParse(String),

  #[error("profile for user {0} missing after upsert")]
  Missing(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
