//! HTTP server wiring for EduCards score aggregation.
//!
//! Mounts the [`educards_api`] router under `/api`, adds a health probe and
//! request tracing, and owns the runtime configuration.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use educards_core::{Aggregator, AggregatorConfig, store::ScoreStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `EDUCARDS_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Optimistic summary-write attempts per play.
  pub max_write_attempts: u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("educards.sqlite3"),
      max_write_attempts: AggregatorConfig::default().max_write_attempts,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `EDUCARDS_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("EDUCARDS").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn aggregator_config(&self) -> AggregatorConfig {
    AggregatorConfig { max_write_attempts: self.max_write_attempts }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn router<S>(aggregator: Arc<Aggregator<S>>) -> Router
where
  S: ScoreStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", educards_api::api_router(aggregator))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
