use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{BASE_XP_TO_LEVEL_UP, DEFAULT_MAX_NEW_CARDS, DEFAULT_MAX_REVIEW_CARDS};

/// A learner's progress record.
///
/// Only the progress fields matter to the engine; credentials and profile
/// data belong to the account service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub email: String,

  // Leveling: xp < xp_to_level_up after every award
  pub xp: i64,
  pub xp_to_level_up: i64,
  pub level: i64,

  // Consecutive active days
  pub streak: i64,
  #[serde(default)]
  pub last_streak_at: Option<DateTime<Utc>>,

  // Caps used by the all-decks overview
  pub max_new_cards_learn: i64,
  pub max_cards_review: i64,
}

impl User {
  pub fn new(name: String, email: String) -> Self {
    Self {
      id: 0,
      name,
      email,
      xp: 0,
      xp_to_level_up: BASE_XP_TO_LEVEL_UP,
      level: 1,
      streak: 0,
      last_streak_at: None,
      max_new_cards_learn: DEFAULT_MAX_NEW_CARDS,
      max_cards_review: DEFAULT_MAX_REVIEW_CARDS,
    }
  }
}
