//! Handlers for `/activities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activities` | Whole catalog, sorted by slug |
//! | `GET`  | `/activities/:slug` | 404 if unknown |
//! | `GET`  | `/activities/:slug/leaderboard` | `?limit` (default 10, max 100) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use educards_core::{
  Aggregator, activity::Activity, store::ScoreStore, summary::ActivitySummary,
};
use serde::Deserialize;

use crate::error::ApiError;

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

/// `GET /activities`
pub async fn list<S>(State(agg): State<Arc<Aggregator<S>>>) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let activities = agg.store().list_activities().await.map_err(ApiError::store)?;
  Ok(Json(activities))
}

/// `GET /activities/:slug`
pub async fn get_one<S>(
  State(agg): State<Arc<Aggregator<S>>>,
  Path(slug): Path<String>,
) -> Result<Json<Activity>, ApiError>
where
  S: ScoreStore + 'static,
{
  Ok(Json(find(&agg, &slug).await?))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
  pub limit: Option<usize>,
}

/// `GET /activities/:slug/leaderboard[?limit=<n>]`
pub async fn leaderboard<S>(
  State(agg): State<Arc<Aggregator<S>>>,
  Path(slug): Path<String>,
  Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<ActivitySummary>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let activity = find(&agg, &slug).await?;
  let limit = params
    .limit
    .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
    .clamp(1, MAX_LEADERBOARD_LIMIT);

  let rows = agg
    .store()
    .top_summaries(activity.activity_id, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

pub(crate) async fn find<S: ScoreStore>(agg: &Aggregator<S>, slug: &str) -> Result<Activity, ApiError> {
  agg
    .store()
    .find_activity_by_slug(slug)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("activity {slug:?} not found")))
}
