use chrono::{DateTime, Duration, Utc};

use crate::config::Sm2Params;
use crate::domain::Card;

/// Scheduling state of a card after one review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Result {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub total_reviews: i64,
  pub last_reviewed_at: DateTime<Utc>,
  pub next_review: DateTime<Utc>,
}

impl Sm2Result {
  /// Copy of `card` carrying this scheduling state
  pub fn apply_to(&self, card: &Card) -> Card {
    Card {
      ease_factor: self.ease_factor,
      interval_days: self.interval_days,
      repetitions: self.repetitions,
      total_reviews: self.total_reviews,
      last_reviewed_at: Some(self.last_reviewed_at),
      next_review: Some(self.next_review),
      ..card.clone()
    }
  }
}

/// Binary-graded SM-2 step.
///
/// A failure drops the card back to a one-day relearning interval and lowers
/// its easiness factor (never below the floor). A success grows the interval
/// 1 day → 6 days → previous interval × easiness factor.
pub fn calculate_sm2(
  passed: bool,
  current_ease_factor: f64,
  current_interval: i64,
  current_repetitions: i64,
  params: &Sm2Params,
) -> (f64, i64, i64) {
  // Stored state may predate the floor or have been edited by hand
  let ease_factor = if current_ease_factor.is_finite() {
    current_ease_factor.max(params.min_ease_factor)
  } else {
    params.default_ease_factor
  };

  if !passed {
    let new_ease_factor = (ease_factor - params.ease_penalty).max(params.min_ease_factor);
    return (new_ease_factor, 1, 0);
  }

  // A success never lowers the factor, even one that already sits above the cap
  let new_ease_factor = (ease_factor + params.ease_bonus).min(params.max_ease_factor.max(ease_factor));
  let new_repetitions = current_repetitions.max(0).saturating_add(1);
  let new_interval = match new_repetitions {
    1 => 1,
    2 => 6,
    _ => ((current_interval.max(1) as f64) * new_ease_factor).round() as i64,
  };

  (
    new_ease_factor,
    new_interval.clamp(1, params.max_interval_days.max(1)),
    new_repetitions,
  )
}

/// Advance `card` by one review graded `passed` at `now`
pub fn advance(card: &Card, passed: bool, now: DateTime<Utc>, params: &Sm2Params) -> Sm2Result {
  let (ease_factor, interval_days, repetitions) = calculate_sm2(
    passed,
    card.ease_factor,
    card.interval_days,
    card.repetitions,
    params,
  );

  Sm2Result {
    ease_factor,
    interval_days,
    repetitions,
    total_reviews: card.total_reviews.max(0).saturating_add(1),
    last_reviewed_at: now,
    next_review: Duration::try_days(interval_days)
      .and_then(|delta| now.checked_add_signed(delta))
      .unwrap_or(DateTime::<Utc>::MAX_UTC),
  }
}
