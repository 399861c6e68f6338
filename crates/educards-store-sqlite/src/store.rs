//! [`SqliteStore`] — the SQLite implementation of [`ScoreStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use educards_core::{
  activity::{Activity, NewActivity},
  play::{NewPlay, PlayEvent},
  store::{ScoreStore, SummaryWrite},
  summary::ActivitySummary,
};

use crate::{
  Result,
  encode::{
    ACTIVITY_COLUMNS, PLAY_COLUMNS, RawActivity, RawPlay, RawSummary, SUMMARY_COLUMNS,
    encode_count, encode_dt, encode_metadata, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An EduCards score store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Encoded column values of an [`ActivitySummary`], ready to bind.
struct SummaryParams {
  subject_id:     String,
  activity_id:    String,
  best_score:     f64,
  best_score_at:  String,
  last_score:     f64,
  plays_count:    i64,
  average_score:  f64,
  max_combo:      u32,
  last_played_at: String,
  updated_at:     String,
  version:        i64,
}

impl SummaryParams {
  fn encode(s: &ActivitySummary) -> Result<Self> {
    Ok(Self {
      subject_id:     encode_uuid(s.subject_id),
      activity_id:    encode_uuid(s.activity_id),
      best_score:     s.best_score,
      best_score_at:  encode_dt(s.best_score_at),
      last_score:     s.last_score,
      plays_count:    encode_count(s.plays_count)?,
      average_score:  s.average_score,
      max_combo:      s.max_combo,
      last_played_at: encode_dt(s.last_played_at),
      updated_at:     encode_dt(s.updated_at),
      version:        encode_count(s.version)?,
    })
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = crate::Error;

  // ── Activities ────────────────────────────────────────────────────────────

  async fn find_activity_by_slug(&self, slug: &str) -> Result<Option<Activity>> {
    let slug = slug.to_owned();

    let raw: Option<RawActivity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE slug = ?1"),
            rusqlite::params![slug],
            RawActivity::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawActivity::into_activity).transpose()
  }

  async fn create_activity(&self, input: NewActivity) -> Result<Option<Activity>> {
    let activity = Activity {
      activity_id: Uuid::new_v4(),
      slug:        input.slug,
      title:       input.title,
      description: input.description,
      category:    input.category,
      difficulty:  input.difficulty,
      is_active:   true,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(activity.activity_id);
    let at_str      = encode_dt(activity.created_at);
    let slug        = activity.slug.clone();
    let title       = activity.title.clone();
    let description = activity.description.clone();
    let category    = activity.category.clone();
    let difficulty  = activity.difficulty.clone();

    // The UNIQUE constraint on slug decides concurrent first plays; the loser
    // inserts nothing.
    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO activities (
             activity_id, slug, title, description, category, difficulty, is_active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
           ON CONFLICT(slug) DO NOTHING",
          rusqlite::params![id_str, slug, title, description, category, difficulty, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted.then_some(activity))
  }

  async fn get_activity(&self, activity_id: Uuid) -> Result<Option<Activity>> {
    let id_str = encode_uuid(activity_id);

    let raw: Option<RawActivity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE activity_id = ?1"),
            rusqlite::params![id_str],
            RawActivity::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawActivity::into_activity).transpose()
  }

  async fn list_activities(&self) -> Result<Vec<Activity>> {
    let raws: Vec<RawActivity> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY slug"))?;
        let rows = stmt
          .query_map([], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  // ── Plays — append-only writes ────────────────────────────────────────────

  async fn append_play(&self, input: NewPlay) -> Result<PlayEvent> {
    let play = PlayEvent::from_new(input, Utc::now());

    let play_id_str     = encode_uuid(play.play_id);
    let subject_id_str  = encode_uuid(play.subject_id);
    let activity_id_str = encode_uuid(play.activity_id);
    let occurred_at_str = encode_dt(play.occurred_at);
    let metadata_str    = encode_metadata(play.metadata.as_ref())?;
    let score           = play.score;
    let duration        = play.duration_seconds;
    let combo           = play.combo;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO play_events (
             play_id, subject_id, activity_id, score, occurred_at,
             duration_seconds, combo, metadata
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            play_id_str,
            subject_id_str,
            activity_id_str,
            score,
            occurred_at_str,
            duration,
            combo,
            metadata_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(play)
  }

  async fn list_plays(&self, subject_id: Uuid, activity_id: Option<Uuid>) -> Result<Vec<PlayEvent>> {
    let subject_id_str  = encode_uuid(subject_id);
    let activity_id_str = activity_id.map(encode_uuid);

    let raws: Vec<RawPlay> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PLAY_COLUMNS} FROM play_events
           WHERE subject_id = ?1
             AND (?2 IS NULL OR activity_id = ?2)
           ORDER BY occurred_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![subject_id_str, activity_id_str], RawPlay::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlay::into_play).collect()
  }

  // ── Summaries ─────────────────────────────────────────────────────────────

  async fn get_summary(&self, subject_id: Uuid, activity_id: Uuid) -> Result<Option<ActivitySummary>> {
    let subject_id_str  = encode_uuid(subject_id);
    let activity_id_str = encode_uuid(activity_id);

    let raw: Option<RawSummary> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {SUMMARY_COLUMNS} FROM activity_summaries
               WHERE subject_id = ?1 AND activity_id = ?2"
            ),
            rusqlite::params![subject_id_str, activity_id_str],
            RawSummary::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSummary::into_summary).transpose()
  }

  async fn upsert_summary(
    &self,
    summary:          ActivitySummary,
    expected_version: Option<u64>,
  ) -> Result<SummaryWrite> {
    let p        = SummaryParams::encode(&summary)?;
    let expected = expected_version.map(encode_count).transpose()?;

    let changed = self
      .conn
      .call(move |conn| {
        let n = match expected {
          None => conn.execute(
            &format!(
              "INSERT INTO activity_summaries ({SUMMARY_COLUMNS})
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
               ON CONFLICT(subject_id, activity_id) DO NOTHING"
            ),
            rusqlite::params![
              p.subject_id,
              p.activity_id,
              p.best_score,
              p.best_score_at,
              p.last_score,
              p.plays_count,
              p.average_score,
              p.max_combo,
              p.last_played_at,
              p.updated_at,
              p.version,
            ],
          )?,
          Some(v) => conn.execute(
            "UPDATE activity_summaries SET
               best_score = ?3, best_score_at = ?4, last_score = ?5,
               plays_count = ?6, average_score = ?7, max_combo = ?8,
               last_played_at = ?9, updated_at = ?10, version = ?11
             WHERE subject_id = ?1 AND activity_id = ?2 AND version = ?12",
            rusqlite::params![
              p.subject_id,
              p.activity_id,
              p.best_score,
              p.best_score_at,
              p.last_score,
              p.plays_count,
              p.average_score,
              p.max_combo,
              p.last_played_at,
              p.updated_at,
              p.version,
              v,
            ],
          )?,
        };
        Ok(n)
      })
      .await?;

    if changed == 1 {
      Ok(SummaryWrite::Written)
    } else {
      tracing::trace!(
        subject_id = %summary.subject_id,
        activity_id = %summary.activity_id,
        ?expected_version,
        "summary version mismatch"
      );
      Ok(SummaryWrite::Conflict)
    }
  }

  async fn list_summaries(&self, subject_id: Uuid) -> Result<Vec<ActivitySummary>> {
    let subject_id_str = encode_uuid(subject_id);

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS} FROM activity_summaries
           WHERE subject_id = ?1
           ORDER BY last_played_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![subject_id_str], RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn top_summaries(&self, activity_id: Uuid, limit: usize) -> Result<Vec<ActivitySummary>> {
    let activity_id_str = encode_uuid(activity_id);
    let limit_val       = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS} FROM activity_summaries
           WHERE activity_id = ?1
           ORDER BY best_score DESC, best_score_at ASC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![activity_id_str, limit_val], RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }
}
