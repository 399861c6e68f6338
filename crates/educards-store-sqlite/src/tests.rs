//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use educards_core::{
  Aggregator, AggregatorConfig,
  activity::{ActivityDefaults, NewActivity},
  play::{NewPlay, PlayEvent, PlayExtras},
  store::{ScoreStore, SummaryWrite},
  summary::ActivitySummary,
};
use serde_json::json;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn activity(s: &SqliteStore, slug: &str) -> Uuid {
  s.create_activity(NewActivity::new(slug, ActivityDefaults::from_slug(slug)))
    .await
    .unwrap()
    .expect("fresh slug")
    .activity_id
}

// ─── Activities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_activity() {
  let s = store().await;

  let defaults = ActivityDefaults {
    title:       "Car Dodge Math Game".into(),
    description: Some("Dodge cars, solve sums".into()),
    category:    Some("math".into()),
    difficulty:  None,
  };
  let created = s
    .create_activity(NewActivity::new("car-dodge", defaults))
    .await
    .unwrap()
    .unwrap();
  assert!(created.is_active);

  let found = s.find_activity_by_slug("car-dodge").await.unwrap().unwrap();
  assert_eq!(found, created);

  let by_id = s.get_activity(created.activity_id).await.unwrap().unwrap();
  assert_eq!(by_id.slug, "car-dodge");
  assert_eq!(by_id.category.as_deref(), Some("math"));
}

#[tokio::test]
async fn missing_activity_returns_none() {
  let s = store().await;
  assert!(s.find_activity_by_slug("nope").await.unwrap().is_none());
  assert!(s.get_activity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_slug_is_not_inserted() {
  let s = store().await;
  let first = activity(&s, "runner").await;

  let again = s
    .create_activity(NewActivity::new("runner", ActivityDefaults::from_slug("runner")))
    .await
    .unwrap();
  assert!(again.is_none());

  let all = s.list_activities().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].activity_id, first);
}

#[tokio::test]
async fn list_activities_is_sorted_by_slug() {
  let s = store().await;
  for slug in ["runner", "flappy-bird", "memory-match"] {
    activity(&s, slug).await;
  }
  let slugs: Vec<_> = s.list_activities().await.unwrap().into_iter().map(|a| a.slug).collect();
  assert_eq!(slugs, ["flappy-bird", "memory-match", "runner"]);
}

// ─── Plays ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_play_roundtrips_extras() {
  let s       = store().await;
  let game    = activity(&s, "physics-puzzle").await;
  let subject = Uuid::new_v4();

  let extras = PlayExtras {
    duration_seconds: Some(93),
    combo:            Some(4),
    metadata:         Some(json!({ "target": 17, "blocks": [5, 12] })),
  };
  let play = s
    .append_play(NewPlay::new(subject, game, 120.0).with_extras(extras))
    .await
    .unwrap();

  let history = s.list_plays(subject, Some(game)).await.unwrap();
  assert_eq!(history, vec![play]);
  assert_eq!(history[0].metadata.as_ref().unwrap()["target"], 17);
}

#[tokio::test]
async fn list_plays_is_newest_first_and_filterable() {
  let s       = store().await;
  let flappy  = activity(&s, "flappy-bird").await;
  let runner  = activity(&s, "runner").await;
  let subject = Uuid::new_v4();

  for (game, score) in [(flappy, 1.0), (runner, 2.0), (flappy, 3.0)] {
    s.append_play(NewPlay::new(subject, game, score)).await.unwrap();
  }
  s.append_play(NewPlay::new(Uuid::new_v4(), flappy, 99.0)).await.unwrap();

  let all: Vec<f64> = s.list_plays(subject, None).await.unwrap().iter().map(|p| p.score).collect();
  assert_eq!(all, [3.0, 2.0, 1.0]);

  let only_flappy: Vec<f64> =
    s.list_plays(subject, Some(flappy)).await.unwrap().iter().map(|p| p.score).collect();
  assert_eq!(only_flappy, [3.0, 1.0]);
}

#[tokio::test]
async fn play_for_unknown_activity_is_rejected() {
  let s = store().await;
  let result = s.append_play(NewPlay::new(Uuid::new_v4(), Uuid::new_v4(), 1.0)).await;
  assert!(result.is_err());
}

// ─── Summaries ───────────────────────────────────────────────────────────────

fn first_summary(subject: Uuid, game: Uuid, score: f64) -> (PlayEvent, ActivitySummary) {
  let ev = PlayEvent::from_new(NewPlay::new(subject, game, score), chrono::Utc::now());
  let s  = ActivitySummary::first(&ev, chrono::Utc::now());
  (ev, s)
}

#[tokio::test]
async fn summary_insert_requires_absence() {
  let s       = store().await;
  let game    = activity(&s, "flappy-bird").await;
  let subject = Uuid::new_v4();
  let (_, first) = first_summary(subject, game, 10.0);

  assert!(s.get_summary(subject, game).await.unwrap().is_none());
  assert_eq!(s.upsert_summary(first.clone(), None).await.unwrap(), SummaryWrite::Written);
  assert_eq!(s.upsert_summary(first.clone(), None).await.unwrap(), SummaryWrite::Conflict);
  assert_eq!(s.get_summary(subject, game).await.unwrap().unwrap(), first);
}

#[tokio::test]
async fn summary_update_is_compare_and_swap() {
  let s       = store().await;
  let game    = activity(&s, "flappy-bird").await;
  let subject = Uuid::new_v4();
  let (ev, first) = first_summary(subject, game, 10.0);
  s.upsert_summary(first.clone(), None).await.unwrap();

  let next = first.next(&ev, chrono::Utc::now());
  assert_eq!(s.upsert_summary(next.clone(), Some(0)).await.unwrap(), SummaryWrite::Conflict);
  assert_eq!(s.upsert_summary(next.clone(), Some(1)).await.unwrap(), SummaryWrite::Written);
  // The version moved on; a writer that read version 1 now loses.
  assert_eq!(s.upsert_summary(next.clone(), Some(1)).await.unwrap(), SummaryWrite::Conflict);

  let stored = s.get_summary(subject, game).await.unwrap().unwrap();
  assert_eq!(stored.version, 2);
  assert_eq!(stored.plays_count, 2);
}

#[tokio::test]
async fn update_of_missing_summary_conflicts() {
  let s    = store().await;
  let game = activity(&s, "flappy-bird").await;
  let (_, first) = first_summary(Uuid::new_v4(), game, 1.0);
  assert_eq!(s.upsert_summary(first, Some(1)).await.unwrap(), SummaryWrite::Conflict);
}

#[tokio::test]
async fn top_summaries_orders_by_best_score() {
  let s    = store().await;
  let game = activity(&s, "flappy-bird").await;
  for score in [40.0, 90.0, 10.0, 70.0] {
    let (_, sum) = first_summary(Uuid::new_v4(), game, score);
    s.upsert_summary(sum, None).await.unwrap();
  }

  let top: Vec<f64> = s.top_summaries(game, 3).await.unwrap().iter().map(|s| s.best_score).collect();
  assert_eq!(top, [90.0, 70.0, 40.0]);
}

#[tokio::test]
async fn tied_best_scores_rank_by_who_reached_them_first() {
  let agg    = Aggregator::new(store().await);
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
  for (subject, score) in [(a, 90.0), (b, 90.0), (a, 10.0)] {
    agg
      .record_play(subject, "flappy-bird", score, PlayExtras::default(), None)
      .await
      .unwrap();
  }

  let game = agg.store().find_activity_by_slug("flappy-bird").await.unwrap().unwrap();
  let top  = agg.store().top_summaries(game.activity_id, 2).await.unwrap();
  // `a` played more recently, but reached 90 before `b` did.
  assert_eq!(top.iter().map(|s| s.subject_id).collect::<Vec<_>>(), [a, b]);
  assert!(top[0].best_score_at < top[1].best_score_at);
  assert!(top[0].last_played_at > top[1].last_played_at);
}

#[tokio::test]
async fn list_summaries_covers_every_activity_of_subject() {
  let s       = store().await;
  let subject = Uuid::new_v4();
  for slug in ["flappy-bird", "runner"] {
    let game = activity(&s, slug).await;
    let (_, sum) = first_summary(subject, game, 5.0);
    s.upsert_summary(sum, None).await.unwrap();
  }
  let game = activity(&s, "car-dodge").await;
  let (_, other) = first_summary(Uuid::new_v4(), game, 5.0);
  s.upsert_summary(other, None).await.unwrap();

  assert_eq!(s.list_summaries(subject).await.unwrap().len(), 2);
}

// ─── Aggregation over SQLite ─────────────────────────────────────────────────

#[tokio::test]
async fn three_plays_on_new_activity() {
  let agg = Aggregator::new(store().await);
  let u1  = Uuid::new_v4();

  let mut last = None;
  for score in [30.0, 50.0, 10.0] {
    last = Some(
      agg
        .record_play(u1, "flappy-bird", score, PlayExtras::default(), None)
        .await
        .unwrap(),
    );
  }
  let summary = last.unwrap().summary;
  assert_eq!(summary.best_score, 50.0);
  assert_eq!(summary.last_score, 10.0);
  assert_eq!(summary.plays_count, 3);
  assert!((summary.average_score - 30.0).abs() < 1e-9);

  let game = agg.store().find_activity_by_slug("flappy-bird").await.unwrap().unwrap();
  assert_eq!(agg.store().get_summary(u1, game.activity_id).await.unwrap().unwrap(), summary);
  assert_eq!(agg.store().list_plays(u1, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_plays_lose_no_updates() {
  const TASKS: u32 = 10;

  let agg = Arc::new(Aggregator::with_config(
    store().await,
    AggregatorConfig { max_write_attempts: TASKS },
  ));
  let subject = Uuid::new_v4();

  let handles: Vec<_> = (0..TASKS)
    .map(|i| {
      let agg = Arc::clone(&agg);
      tokio::spawn(async move {
        agg
          .record_play(subject, "flappy-bird", f64::from(i), PlayExtras::default(), None)
          .await
      })
    })
    .collect();

  for h in handles {
    h.await.unwrap().unwrap();
  }

  let game = agg.store().find_activity_by_slug("flappy-bird").await.unwrap().unwrap();
  let summary = agg.store().get_summary(subject, game.activity_id).await.unwrap().unwrap();
  assert_eq!(summary.plays_count, u64::from(TASKS));
  assert_eq!(summary.best_score, f64::from(TASKS - 1));
  let mean = (0..TASKS).map(f64::from).sum::<f64>() / f64::from(TASKS);
  assert!((summary.average_score - mean).abs() < 1e-9);
  assert_eq!(agg.store().list_plays(subject, None).await.unwrap().len(), TASKS as usize);
  assert_eq!(agg.store().list_activities().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_resolution_yields_one_activity() {
  let agg = Arc::new(Aggregator::new(store().await));

  let handles: Vec<_> = (0..8)
    .map(|_| {
      let agg = Arc::clone(&agg);
      tokio::spawn(async move {
        agg
          .resolve_activity_id("memory-match", ActivityDefaults::from_slug("memory-match"))
          .await
      })
    })
    .collect();

  let mut ids = Vec::new();
  for h in handles {
    ids.push(h.await.unwrap().unwrap());
  }
  ids.dedup();
  assert_eq!(ids.len(), 1);
  assert_eq!(agg.store().list_activities().await.unwrap().len(), 1);
}

#[tokio::test]
async fn data_survives_reopen() {
  let path = std::env::temp_dir().join(format!("educards-{}.sqlite3", Uuid::new_v4()));
  let subject = Uuid::new_v4();

  {
    let agg = Aggregator::new(SqliteStore::open(&path).await.unwrap());
    agg
      .record_play(subject, "runner", 12.0, PlayExtras::default(), None)
      .await
      .unwrap();
  }

  let reopened = SqliteStore::open(&path).await.unwrap();
  let game = reopened.find_activity_by_slug("runner").await.unwrap().unwrap();
  let summary = reopened.get_summary(subject, game.activity_id).await.unwrap().unwrap();
  assert_eq!(summary.best_score, 12.0);

  drop(reopened);
  let _ = std::fs::remove_file(&path);
}
