//! [`Aggregator`] — the single entry point game-completion handlers call.
//!
//! `record_play` resolves the activity by slug (creating it on first use),
//! appends the play to the history, and folds it into the pair's summary.
//! Summary writes are optimistic: a write that loses against a concurrent
//! writer is re-read, recomputed and retried up to
//! [`AggregatorConfig::max_write_attempts`] times.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AggregationError, Error,
  activity::{ActivityDefaults, NewActivity},
  play::{NewPlay, PlayEvent, PlayExtras},
  store::{ScoreStore, SummaryWrite},
  summary::ActivitySummary,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
  /// Summary write attempts before giving up with
  /// [`AggregationError::WriteConflict`]. Values below 1 are treated as 1.
  pub max_write_attempts: u32,
}

impl Default for AggregatorConfig {
  fn default() -> Self { Self { max_write_attempts: 5 } }
}

/// The result of a successful [`Aggregator::record_play`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedPlay {
  pub play:    PlayEvent,
  pub summary: ActivitySummary,
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

pub struct Aggregator<S> {
  store:  S,
  config: AggregatorConfig,
}

impl<S: ScoreStore> Aggregator<S> {
  pub fn new(store: S) -> Self { Self::with_config(store, AggregatorConfig::default()) }

  pub fn with_config(store: S, config: AggregatorConfig) -> Self { Self { store, config } }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &AggregatorConfig { &self.config }

  /// Record one finished play and update the running statistics.
  ///
  /// If `defaults` is `None` and the activity does not exist yet, it is
  /// created with a title derived from the slug. A failure at any step aborts
  /// the remaining steps; in particular a failed append leaves the summary
  /// untouched.
  pub async fn record_play(
    &self,
    subject_id: Uuid,
    activity_slug: &str,
    score: f64,
    extras: PlayExtras,
    defaults: Option<ActivityDefaults>,
  ) -> Result<RecordedPlay, AggregationError> {
    let defaults = defaults.unwrap_or_else(|| ActivityDefaults::from_slug(activity_slug));
    let activity_id = self.resolve_activity_id(activity_slug, defaults).await?;
    let play = self.record(subject_id, activity_id, score, extras).await?;
    let summary = self.apply(&play).await?;
    Ok(RecordedPlay { play, summary })
  }

  /// Get-or-create an activity by slug.
  ///
  /// A creation that loses to a concurrent creator of the same slug re-reads
  /// and returns the winner's id.
  pub async fn resolve_activity_id(
    &self,
    slug: &str,
    defaults: ActivityDefaults,
  ) -> Result<Uuid, AggregationError> {
    let resolution_err = |source: Box<dyn std::error::Error + Send + Sync>| {
      AggregationError::ActivityResolution { slug: slug.to_owned(), source }
    };

    if let Some(activity) = self
      .store
      .find_activity_by_slug(slug)
      .await
      .map_err(|e| resolution_err(Box::new(e)))?
    {
      return Ok(activity.activity_id);
    }

    let created = self
      .store
      .create_activity(NewActivity::new(slug, defaults))
      .await
      .map_err(|e| resolution_err(Box::new(e)))?;

    if let Some(activity) = created {
      tracing::debug!(slug, activity_id = %activity.activity_id, "created activity");
      return Ok(activity.activity_id);
    }

    tracing::debug!(slug, "activity created concurrently, re-reading");
    self
      .store
      .find_activity_by_slug(slug)
      .await
      .map_err(|e| resolution_err(Box::new(e)))?
      .map(|a| a.activity_id)
      .ok_or_else(|| resolution_err(Box::new(Error::ActivityNotFound(slug.to_owned()))))
  }

  /// Append a play to the history.
  pub async fn record(
    &self,
    subject_id: Uuid,
    activity_id: Uuid,
    score: f64,
    extras: PlayExtras,
  ) -> Result<PlayEvent, AggregationError> {
    self
      .store
      .append_play(NewPlay::new(subject_id, activity_id, score).with_extras(extras))
      .await
      .map_err(|e| AggregationError::Record(Box::new(e)))
  }

  /// Fold `event` into the summary for its (subject, activity) pair.
  pub async fn apply(&self, event: &PlayEvent) -> Result<ActivitySummary, AggregationError> {
    let (subject_id, activity_id) = (event.subject_id, event.activity_id);
    let write_err = |source: Box<dyn std::error::Error + Send + Sync>| {
      AggregationError::AggregateWrite { subject_id, activity_id, source }
    };

    let attempts = self.config.max_write_attempts.max(1);
    for attempt in 1..=attempts {
      let prev = self
        .store
        .get_summary(subject_id, activity_id)
        .await
        .map_err(|e| write_err(Box::new(e)))?;

      let next = ActivitySummary::fold(prev.as_ref(), event, Utc::now());
      let expected = prev.as_ref().map(|p| p.version);

      match self
        .store
        .upsert_summary(next.clone(), expected)
        .await
        .map_err(|e| write_err(Box::new(e)))?
      {
        SummaryWrite::Written => return Ok(next),
        SummaryWrite::Conflict => {
          tracing::debug!(%subject_id, %activity_id, attempt, "summary write conflict, retrying");
        }
      }
    }

    tracing::warn!(%subject_id, %activity_id, attempts, "giving up on summary write");
    Err(AggregationError::WriteConflict { subject_id, activity_id, attempts })
  }
}
