//! Play events — one immutable record per finished attempt at an activity.
//!
//! Play events are never updated or deleted. The per-pair statistics live in
//! [`ActivitySummary`](crate::summary::ActivitySummary) and are derived from
//! the events as they are applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity-specific details attached to a play. Opaque to the aggregator
/// except for `combo`, which feeds `max_combo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayExtras {
  #[serde(default)]
  pub duration_seconds: Option<u32>,
  #[serde(default)]
  pub combo:            Option<u32>,
  #[serde(default)]
  pub metadata:         Option<serde_json::Value>,
}

/// Input to [`ScoreStore::append_play`](crate::store::ScoreStore::append_play).
///
/// The score is not validated here; callers are expected to clamp it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlay {
  pub subject_id:  Uuid,
  pub activity_id: Uuid,
  pub score:       f64,
  pub extras:      PlayExtras,
}

impl NewPlay {
  pub fn new(subject_id: Uuid, activity_id: Uuid, score: f64) -> Self {
    Self { subject_id, activity_id, score, extras: PlayExtras::default() }
  }

  pub fn with_extras(mut self, extras: PlayExtras) -> Self {
    self.extras = extras;
    self
  }
}

/// A recorded play. `play_id` and `occurred_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
  pub play_id:          Uuid,
  pub subject_id:       Uuid,
  pub activity_id:      Uuid,
  pub score:            f64,
  pub occurred_at:      DateTime<Utc>,
  pub duration_seconds: Option<u32>,
  pub combo:            Option<u32>,
  pub metadata:         Option<serde_json::Value>,
}

impl PlayEvent {
  /// Stamp a [`NewPlay`] with a fresh id and the given time.
  pub fn from_new(input: NewPlay, occurred_at: DateTime<Utc>) -> Self {
    Self {
      play_id:          Uuid::new_v4(),
      subject_id:       input.subject_id,
      activity_id:      input.activity_id,
      score:            input.score,
      occurred_at,
      duration_seconds: input.extras.duration_seconds,
      combo:            input.extras.combo,
      metadata:         input.extras.metadata,
    }
  }

  /// The combo value the aggregator uses; absent counts as zero.
  pub fn combo_or_zero(&self) -> u32 { self.combo.unwrap_or(0) }
}
