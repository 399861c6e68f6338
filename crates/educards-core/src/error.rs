//! Error types for `educards-core`.

use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised by domain constructors.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid activity slug: {0:?}")]
  InvalidSlug(String),

  #[error("activity not found: {0}")]
  ActivityNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of one step of the record-and-aggregate pipeline.
///
/// Store errors are boxed so the type does not depend on the backend. None of
/// these are retried by the library; the caller decides whether to retry,
/// queue, or surface them.
#[derive(Debug, Error)]
pub enum AggregationError {
  /// Slug lookup or creation failed.
  #[error("failed to resolve activity {slug:?}: {source}")]
  ActivityResolution {
    slug:   String,
    #[source]
    source: BoxError,
  },

  /// The play-event append failed; the summary was not touched.
  #[error("failed to record play: {0}")]
  Record(#[source] BoxError),

  /// The summary read or write failed.
  #[error("failed to write summary for {subject_id}/{activity_id}: {source}")]
  AggregateWrite {
    subject_id:  Uuid,
    activity_id: Uuid,
    #[source]
    source:      BoxError,
  },

  /// Every optimistic write attempt lost against a concurrent writer.
  #[error("summary for {subject_id}/{activity_id} still conflicting after {attempts} attempts")]
  WriteConflict {
    subject_id:  Uuid,
    activity_id: Uuid,
    attempts:    u32,
  },
}
