use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DeckDefaults, DEFAULT_MAX_NEW_CARDS, DEFAULT_MAX_REVIEW_CARDS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
  pub id: i64,
  pub user_id: i64,
  /// Public decks are visible to everyone but still scheduled per copy
  #[serde(default)]
  pub is_global: bool,
  pub name: String,
  #[serde(default)]
  pub description: String,

  // Daily caps
  pub max_new_cards: i64,
  pub max_review_cards: i64,

  // Consumption today, reset once per calendar day
  #[serde(default)]
  pub cur_new_cards: i64,
  #[serde(default)]
  pub cur_review_cards: i64,
  /// When the counters above were last zeroed
  #[serde(rename = "last_review", default)]
  pub last_quota_reset: Option<DateTime<Utc>>,

  /// Cards answered correctly on their first ever review
  #[serde(default)]
  pub total_learned_cards: i64,
}

impl Deck {
  pub fn new(user_id: i64, name: String) -> Self {
    Self::with_defaults(
      user_id,
      name,
      &DeckDefaults {
        max_new_cards: DEFAULT_MAX_NEW_CARDS,
        max_review_cards: DEFAULT_MAX_REVIEW_CARDS,
      },
    )
  }

  pub fn with_defaults(user_id: i64, name: String, defaults: &DeckDefaults) -> Self {
    Self {
      id: 0,
      user_id,
      is_global: false,
      name,
      description: String::new(),
      max_new_cards: defaults.max_new_cards,
      max_review_cards: defaults.max_review_cards,
      cur_new_cards: 0,
      cur_review_cards: 0,
      last_quota_reset: None,
      total_learned_cards: 0,
    }
  }
}
