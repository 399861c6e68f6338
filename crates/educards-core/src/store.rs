//! The `ScoreStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `educards-store-sqlite`).
//! Higher layers (`educards-api`, the [`Aggregator`](crate::Aggregator))
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  activity::{Activity, NewActivity},
  play::{NewPlay, PlayEvent},
  summary::ActivitySummary,
};

/// Outcome of a conditional summary write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryWrite {
  Written,
  /// The stored row did not match the expected version (or already existed
  /// when none was expected). Nothing was written.
  Conflict,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an EduCards score store backend.
///
/// Play events are append-only. Summaries are only ever written through
/// [`ScoreStore::upsert_summary`], which is a compare-and-swap on
/// [`ActivitySummary::version`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Activities ────────────────────────────────────────────────────────

  /// Look up an activity by slug. Returns `None` if the catalog has no entry.
  fn find_activity_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + 'a;

  /// Insert a new activity. Returns `None` without writing if the slug is
  /// already taken.
  fn create_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  fn get_activity(
    &self,
    activity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  fn list_activities(
    &self,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  // ── Plays — append-only writes ────────────────────────────────────────

  /// Record a play and return the persisted event. `occurred_at` is set by
  /// the store.
  fn append_play(
    &self,
    input: NewPlay,
  ) -> impl Future<Output = Result<PlayEvent, Self::Error>> + Send + '_;

  /// Play history for a subject, newest first, optionally restricted to one
  /// activity.
  fn list_plays(
    &self,
    subject_id: Uuid,
    activity_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<PlayEvent>, Self::Error>> + Send + '_;

  // ── Summaries ─────────────────────────────────────────────────────────

  /// Read the summary for a pair. Absence is not an error.
  fn get_summary(
    &self,
    subject_id: Uuid,
    activity_id: Uuid,
  ) -> impl Future<Output = Result<Option<ActivitySummary>, Self::Error>> + Send + '_;

  /// Conditionally write `summary`.
  ///
  /// - `expected_version == None`: insert only if no row exists for the pair.
  /// - `expected_version == Some(v)`: replace only if the stored version is `v`.
  ///
  /// Anything else yields [`SummaryWrite::Conflict`].
  fn upsert_summary(
    &self,
    summary: ActivitySummary,
    expected_version: Option<u64>,
  ) -> impl Future<Output = Result<SummaryWrite, Self::Error>> + Send + '_;

  /// All summaries for a subject, most recently played first.
  fn list_summaries(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ActivitySummary>, Self::Error>> + Send + '_;

  /// Top `limit` summaries for an activity by best score; ties go to whoever
  /// reached that score first (earliest `best_score_at`).
  fn top_summaries(
    &self,
    activity_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ActivitySummary>, Self::Error>> + Send + '_;
}
