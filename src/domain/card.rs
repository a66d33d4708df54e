use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_EASE_FACTOR;

/// Review category a due card falls into.
///
/// Clients colour-code these: new cards blue, lapsed red, mature green. The
/// numeric codes are the ones stored and sent as `card_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
  /// Never reviewed
  New,
  /// Reviewed before, but the repetition streak is broken
  Lapsed,
  /// At least one success since the last lapse
  Mature,
}

impl CardCategory {
  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      0 => Some(Self::New),
      1 => Some(Self::Lapsed),
      2 => Some(Self::Mature),
      _ => None,
    }
  }

  pub fn code(&self) -> u8 {
    match self {
      Self::New => 0,
      Self::Lapsed => 1,
      Self::Mature => 2,
    }
  }

  pub fn color(&self) -> &'static str {
    match self {
      Self::New => "blue",
      Self::Lapsed => "red",
      Self::Mature => "green",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub id: i64,
  pub deck_id: i64,
  pub user_id: i64,
  /// Position within the deck as authored
  #[serde(default)]
  pub index: i64,
  pub question: String,
  pub answer: String,
  #[serde(default)]
  pub wrong_answers: Vec<String>,
  #[serde(default)]
  pub question_img_url: Option<String>,
  #[serde(default)]
  pub question_img_label: Option<String>,

  // SM-2 state
  /// Consecutive successes since the last lapse
  #[serde(rename = "sm2_n", default)]
  pub repetitions: i64,
  #[serde(rename = "sm2_ef", default = "default_ease_factor")]
  pub ease_factor: f64,
  #[serde(rename = "sm2_i", default)]
  pub interval_days: i64,
  /// Every review ever, lapses included; zero means the card was never shown
  #[serde(rename = "num_reviews", default)]
  pub total_reviews: i64,
  #[serde(default)]
  pub last_reviewed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub next_review: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
  DEFAULT_EASE_FACTOR
}

impl Card {
  pub fn new(
    deck_id: i64,
    user_id: i64,
    question: String,
    answer: String,
    wrong_answers: Vec<String>,
  ) -> Self {
    Self {
      id: 0,
      deck_id,
      user_id,
      index: 0,
      question,
      answer,
      wrong_answers,
      question_img_url: None,
      question_img_label: None,
      repetitions: 0,
      ease_factor: DEFAULT_EASE_FACTOR,
      interval_days: 0,
      total_reviews: 0,
      last_reviewed_at: None,
      next_review: None,
    }
  }

  pub fn is_new(&self) -> bool {
    self.total_reviews == 0
  }

  /// Same card with its scheduling state back at creation defaults
  pub fn reset_schedule(self, ease_factor: f64) -> Self {
    Self {
      repetitions: 0,
      ease_factor,
      interval_days: 0,
      total_reviews: 0,
      last_reviewed_at: None,
      next_review: None,
      ..self
    }
  }

  /// A fresh copy of this card's content for another deck.
  ///
  /// The copy has no identity yet (id 0) and starts unreviewed.
  pub fn copy_to_deck(&self, deck_id: i64) -> Self {
    let copy = Self {
      id: 0,
      deck_id,
      ..self.clone()
    };
    copy.reset_schedule(DEFAULT_EASE_FACTOR)
  }
}
