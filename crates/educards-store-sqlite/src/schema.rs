//! SQL schema for the EduCards SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS activities (
    activity_id TEXT PRIMARY KEY,
    slug        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    description TEXT,
    category    TEXT,
    difficulty  TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

-- Play events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS play_events (
    play_id          TEXT PRIMARY KEY,
    subject_id       TEXT NOT NULL,
    activity_id      TEXT NOT NULL REFERENCES activities(activity_id),
    score            REAL NOT NULL,
    occurred_at      TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    duration_seconds INTEGER,
    combo            INTEGER,
    metadata         TEXT             -- JSON or NULL
);

-- One row per (subject, activity); written only by compare-and-swap on version.
CREATE TABLE IF NOT EXISTS activity_summaries (
    subject_id     TEXT NOT NULL,
    activity_id    TEXT NOT NULL REFERENCES activities(activity_id),
    best_score     REAL NOT NULL,
    best_score_at  TEXT NOT NULL,    -- when best_score was first reached
    last_score     REAL NOT NULL,
    plays_count    INTEGER NOT NULL,
    average_score  REAL NOT NULL,
    max_combo      INTEGER NOT NULL DEFAULT 0,
    last_played_at TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    version        INTEGER NOT NULL,
    PRIMARY KEY (subject_id, activity_id)
);

CREATE INDEX IF NOT EXISTS plays_subject_idx     ON play_events(subject_id, activity_id);
CREATE INDEX IF NOT EXISTS plays_occurred_idx    ON play_events(occurred_at);
CREATE INDEX IF NOT EXISTS summaries_activity_idx ON activity_summaries(activity_id, best_score DESC, best_score_at);

PRAGMA user_version = 1;
";
