//! JSON REST API for EduCards score aggregation.
//!
//! Exposes an axum [`Router`] backed by an [`Aggregator`] over any
//! [`ScoreStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", educards_api::api_router(aggregator.clone()))
//! ```

pub mod activities;
pub mod error;
pub mod plays;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use educards_core::{Aggregator, store::ScoreStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `aggregator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(aggregator: Arc<Aggregator<S>>) -> Router<()>
where
  S: ScoreStore + 'static,
{
  Router::new()
    // Plays
    .route("/plays", post(plays::create::<S>))
    // Activities
    .route("/activities", get(activities::list::<S>))
    .route("/activities/{slug}", get(activities::get_one::<S>))
    .route("/activities/{slug}/leaderboard", get(activities::leaderboard::<S>))
    // Subjects
    .route("/subjects/{id}/summaries", get(subjects::summaries::<S>))
    .route("/subjects/{id}/plays", get(subjects::plays::<S>))
    .with_state(aggregator)
}
