//! Activity catalog types.
//!
//! An activity is a game or quiz identified by a human-readable slug such as
//! `"flappy-bird"`. Catalog rows are created lazily the first time a slug is
//! played, using caller-supplied [`ActivityDefaults`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Catalog row ─────────────────────────────────────────────────────────────

/// A persisted activity catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id: Uuid,
  /// Natural key; unique across the catalog.
  pub slug:        String,
  pub title:       String,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub difficulty:  Option<String>,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
}

/// Descriptive fields used when an activity has to be created on first play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefaults {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub category:    Option<String>,
  #[serde(default)]
  pub difficulty:  Option<String>,
}

impl ActivityDefaults {
  /// Defaults with a title derived from the slug: `"flappy-bird"` becomes
  /// `"Flappy Bird"`.
  pub fn from_slug(slug: &str) -> Self {
    let title = slug
      .split('-')
      .filter(|w| !w.is_empty())
      .map(|w| {
        let mut chars = w.chars();
        match chars.next() {
          Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
          None => String::new(),
        }
      })
      .collect::<Vec<_>>()
      .join(" ");

    Self { title, ..Self::default() }
  }
}

/// Input to [`ScoreStore::create_activity`](crate::store::ScoreStore::create_activity).
/// The store assigns `activity_id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
  pub slug:        String,
  pub title:       String,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub difficulty:  Option<String>,
}

impl NewActivity {
  pub fn new(slug: impl Into<String>, defaults: ActivityDefaults) -> Self {
    Self {
      slug:        slug.into(),
      title:       defaults.title,
      description: defaults.description,
      category:    defaults.category,
      difficulty:  defaults.difficulty,
    }
  }
}

// ─── Slugs ───────────────────────────────────────────────────────────────────

/// Check that `slug` is lowercase ASCII alphanumerics separated by single
/// hyphens, with no leading or trailing hyphen.
pub fn validate_slug(slug: &str) -> Result<()> {
  let well_formed = !slug.is_empty()
    && slug
      .split('-')
      .all(|w| !w.is_empty() && w.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));

  if well_formed {
    Ok(())
  } else {
    Err(Error::InvalidSlug(slug.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn title_is_derived_from_slug() {
    assert_eq!(ActivityDefaults::from_slug("flappy-bird").title, "Flappy Bird");
    assert_eq!(ActivityDefaults::from_slug("car-dodge-2").title, "Car Dodge 2");
    assert_eq!(ActivityDefaults::from_slug("runner").title, "Runner");
  }

  #[test]
  fn accepts_well_formed_slugs() {
    for slug in ["flappy-bird", "runner", "math-calculator-2", "x1"] {
      assert!(validate_slug(slug).is_ok(), "{slug}");
    }
  }

  #[test]
  fn rejects_malformed_slugs() {
    for slug in ["", "-flappy", "flappy-", "flappy--bird", "Flappy", "flappy bird", "flappy_bird"] {
      assert!(matches!(validate_slug(slug), Err(Error::InvalidSlug(_))), "{slug:?}");
    }
  }

  #[test]
  fn new_activity_copies_defaults() {
    let defaults = ActivityDefaults {
      title:       "Physics Puzzle".into(),
      description: Some("Sum blocks to reach the target".into()),
      category:    Some("puzzle".into()),
      difficulty:  Some("normal".into()),
    };
    let new = NewActivity::new("physics-puzzle", defaults);
    assert_eq!(new.slug, "physics-puzzle");
    assert_eq!(new.title, "Physics Puzzle");
    assert_eq!(new.category.as_deref(), Some("puzzle"));
  }
}
