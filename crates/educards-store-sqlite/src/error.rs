//! Error type for `educards-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A counter does not fit the column type (or a stored value does not fit
  /// the domain type). Carries the offending value.
  #[error("counter out of range: {0}")]
  CounterRange(i128),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
