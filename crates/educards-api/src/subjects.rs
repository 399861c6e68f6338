//! Handlers for `/subjects/:id/...` read endpoints (profile projection).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects/:id/summaries` | Every activity the subject has played |
//! | `GET`  | `/subjects/:id/plays` | History, newest first; optional `?activity_slug` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use educards_core::{
  Aggregator, play::PlayEvent, store::ScoreStore, summary::ActivitySummary,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{activities, error::ApiError};

/// `GET /subjects/:id/summaries`
pub async fn summaries<S>(
  State(agg): State<Arc<Aggregator<S>>>,
  Path(subject_id): Path<Uuid>,
) -> Result<Json<Vec<ActivitySummary>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let rows = agg.store().list_summaries(subject_id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct PlaysParams {
  pub activity_slug: Option<String>,
}

/// `GET /subjects/:id/plays[?activity_slug=<slug>]`
pub async fn plays<S>(
  State(agg): State<Arc<Aggregator<S>>>,
  Path(subject_id): Path<Uuid>,
  Query(params): Query<PlaysParams>,
) -> Result<Json<Vec<PlayEvent>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let activity_id = match params.activity_slug.as_deref() {
    Some(slug) => Some(activities::find(&agg, slug).await?.activity_id),
    None => None,
  };

  let rows = agg
    .store()
    .list_plays(subject_id, activity_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
