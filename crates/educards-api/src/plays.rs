//! Handler for `POST /plays` — the single call a game-completion handler
//! makes per finished play.
//!
//! Body: [`RecordPlayBody`]. Returns 201 + [`RecordedPlay`].

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use educards_core::{
  Aggregator, RecordedPlay,
  activity::{ActivityDefaults, validate_slug},
  play::PlayExtras,
  store::ScoreStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RecordPlayBody {
  pub subject_id:    Uuid,
  pub activity_slug: String,
  pub score:         f64,
  /// `duration_seconds`, `combo`, `metadata` at the top level of the body.
  #[serde(flatten)]
  pub extras:        PlayExtras,
  /// Catalog fields used if the activity has never been played before.
  pub activity:      Option<ActivityDefaults>,
}

impl RecordPlayBody {
  fn validate(&self) -> Result<(), ApiError> {
    validate_slug(&self.activity_slug).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !self.score.is_finite() || self.score < 0.0 {
      return Err(ApiError::BadRequest(format!(
        "score must be a finite number >= 0, got {}",
        self.score
      )));
    }
    Ok(())
  }
}

/// `POST /plays`
pub async fn create<S>(
  State(agg): State<Arc<Aggregator<S>>>,
  Json(body): Json<RecordPlayBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore + 'static,
{
  body.validate()?;

  let recorded: RecordedPlay = agg
    .record_play(body.subject_id, &body.activity_slug, body.score, body.extras, body.activity)
    .await
    .inspect_err(|e| {
      tracing::warn!(
        subject_id = %body.subject_id,
        slug = %body.activity_slug,
        error = %e,
        "failed to save play"
      );
    })?;

  tracing::debug!(
    subject_id = %body.subject_id,
    slug = %body.activity_slug,
    plays = recorded.summary.plays_count,
    "play saved"
  );
  Ok((StatusCode::CREATED, Json(recorded)))
}
