//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, play metadata as compact JSON. Counters are `u64` in the domain
//! and `INTEGER` (i64) in SQLite.

use chrono::{DateTime, Utc};
use educards_core::{activity::Activity, play::PlayEvent, summary::ActivitySummary};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn encode_count(n: u64) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::CounterRange(n.into()))
}

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::CounterRange(n.into()))
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn encode_metadata(m: Option<&serde_json::Value>) -> Result<Option<String>> {
  Ok(m.map(serde_json::to_string).transpose()?)
}

pub fn decode_metadata(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ACTIVITY_COLUMNS: &str =
  "activity_id, slug, title, description, category, difficulty, is_active, created_at";

/// Raw values read directly from an `activities` row.
pub struct RawActivity {
  pub activity_id: String,
  pub slug:        String,
  pub title:       String,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub difficulty:  Option<String>,
  pub is_active:   bool,
  pub created_at:  String,
}

impl RawActivity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id: row.get(0)?,
      slug:        row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      category:    row.get(4)?,
      difficulty:  row.get(5)?,
      is_active:   row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      activity_id: decode_uuid(&self.activity_id)?,
      slug:        self.slug,
      title:       self.title,
      description: self.description,
      category:    self.category,
      difficulty:  self.difficulty,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const PLAY_COLUMNS: &str =
  "play_id, subject_id, activity_id, score, occurred_at, duration_seconds, combo, metadata";

/// Raw values read directly from a `play_events` row.
pub struct RawPlay {
  pub play_id:          String,
  pub subject_id:       String,
  pub activity_id:      String,
  pub score:            f64,
  pub occurred_at:      String,
  pub duration_seconds: Option<u32>,
  pub combo:            Option<u32>,
  pub metadata:         Option<String>,
}

impl RawPlay {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      play_id:          row.get(0)?,
      subject_id:       row.get(1)?,
      activity_id:      row.get(2)?,
      score:            row.get(3)?,
      occurred_at:      row.get(4)?,
      duration_seconds: row.get(5)?,
      combo:            row.get(6)?,
      metadata:         row.get(7)?,
    })
  }

  pub fn into_play(self) -> Result<PlayEvent> {
    Ok(PlayEvent {
      play_id:          decode_uuid(&self.play_id)?,
      subject_id:       decode_uuid(&self.subject_id)?,
      activity_id:      decode_uuid(&self.activity_id)?,
      score:            self.score,
      occurred_at:      decode_dt(&self.occurred_at)?,
      duration_seconds: self.duration_seconds,
      combo:            self.combo,
      metadata:         decode_metadata(self.metadata.as_deref())?,
    })
  }
}

pub const SUMMARY_COLUMNS: &str = "subject_id, activity_id, best_score, best_score_at, last_score, \
   plays_count, average_score, max_combo, last_played_at, updated_at, version";

/// Raw values read directly from an `activity_summaries` row.
pub struct RawSummary {
  pub subject_id:     String,
  pub activity_id:    String,
  pub best_score:     f64,
  pub best_score_at:  String,
  pub last_score:     f64,
  pub plays_count:    i64,
  pub average_score:  f64,
  pub max_combo:      u32,
  pub last_played_at: String,
  pub updated_at:     String,
  pub version:        i64,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:     row.get(0)?,
      activity_id:    row.get(1)?,
      best_score:     row.get(2)?,
      best_score_at:  row.get(3)?,
      last_score:     row.get(4)?,
      plays_count:    row.get(5)?,
      average_score:  row.get(6)?,
      max_combo:      row.get(7)?,
      last_played_at: row.get(8)?,
      updated_at:     row.get(9)?,
      version:        row.get(10)?,
    })
  }

  pub fn into_summary(self) -> Result<ActivitySummary> {
    Ok(ActivitySummary {
      subject_id:     decode_uuid(&self.subject_id)?,
      activity_id:    decode_uuid(&self.activity_id)?,
      best_score:     self.best_score,
      best_score_at:  decode_dt(&self.best_score_at)?,
      last_score:     self.last_score,
      plays_count:    decode_count(self.plays_count)?,
      average_score:  self.average_score,
      max_combo:      self.max_combo,
      last_played_at: decode_dt(&self.last_played_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      version:        decode_count(self.version)?,
    })
  }
}
