//! Per-(subject, activity) running statistics and the pure update rule.
//!
//! The average is maintained incrementally,
//! `(average * plays_count + score) / (plays_count + 1)`, rather than
//! recomputed from history. Results may drift from an exact recomputation by
//! floating-point rounding; that drift is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::play::PlayEvent;

/// The aggregate row for one subject on one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
  pub subject_id:     Uuid,
  pub activity_id:    Uuid,
  /// Highest score seen. Never decreases.
  pub best_score:     f64,
  /// When `best_score` was first reached; a later equal score keeps it.
  pub best_score_at:  DateTime<Utc>,
  pub last_score:     f64,
  pub plays_count:    u64,
  pub average_score:  f64,
  /// Highest combo seen; plays without a combo count as 0.
  pub max_combo:      u32,
  pub last_played_at: DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  /// Optimistic-concurrency counter: 1 on creation, +1 per applied play.
  pub version:        u64,
}

impl ActivitySummary {
  /// The summary created by the first play on a pair.
  pub fn first(event: &PlayEvent, now: DateTime<Utc>) -> Self {
    Self {
      subject_id:     event.subject_id,
      activity_id:    event.activity_id,
      best_score:     event.score,
      best_score_at:  event.occurred_at,
      last_score:     event.score,
      plays_count:    1,
      average_score:  event.score,
      max_combo:      event.combo_or_zero(),
      last_played_at: event.occurred_at,
      updated_at:     now,
      version:        1,
    }
  }

  /// The summary after applying `event` on top of `self`.
  pub fn next(&self, event: &PlayEvent, now: DateTime<Utc>) -> Self {
    let plays_count = self.plays_count + 1;
    let average_score =
      (self.average_score * self.plays_count as f64 + event.score) / plays_count as f64;
    let (best_score, best_score_at) = if event.score > self.best_score {
      (event.score, event.occurred_at)
    } else {
      (self.best_score, self.best_score_at)
    };

    Self {
      subject_id: self.subject_id,
      activity_id: self.activity_id,
      best_score,
      best_score_at,
      last_score: event.score,
      plays_count,
      average_score,
      max_combo: self.max_combo.max(event.combo_or_zero()),
      last_played_at: event.occurred_at,
      updated_at: now,
      version: self.version + 1,
    }
  }

  /// Apply `event` to an optional previous summary.
  pub fn fold(prev: Option<&Self>, event: &PlayEvent, now: DateTime<Utc>) -> Self {
    match prev {
      Some(p) => p.next(event, now),
      None => Self::first(event, now),
    }
  }
}
