//! Fixtures shared by unit tests.
//!
//! Everything here is built at fixed instants so tests never depend on the
//! wall clock.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{Card, Deck, User};

/// UTC instant from calendar components
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(year, month, day, hour, minute, 0)
    .single()
    .expect("valid test timestamp")
}

/// A never-reviewed card in deck 1
pub fn new_card(id: i64) -> Card {
  let mut card = Card::new(1, 1, format!("question {}", id), format!("answer {}", id), vec![]);
  card.id = id;
  card
}

/// A card that has been reviewed before and is due at `due`
pub fn reviewed_card(id: i64, repetitions: i64, interval_days: i64, due: DateTime<Utc>) -> Card {
  let mut card = new_card(id);
  card.repetitions = repetitions;
  card.interval_days = interval_days;
  card.total_reviews = repetitions.max(1);
  card.last_reviewed_at = Some(due - Duration::days(interval_days));
  card.next_review = Some(due);
  card
}

/// A lapsed card (last answer was wrong) due at `due`
pub fn lapsed_card(id: i64, due: DateTime<Utc>) -> Card {
  let mut card = reviewed_card(id, 0, 1, due);
  card.total_reviews = 3;
  card
}

/// Deck 1 with default caps, counters last reset at `reset`
pub fn deck_reset_at(reset: DateTime<Utc>) -> Deck {
  let mut deck = Deck::new(1, "Vocabulary".to_string());
  deck.id = 1;
  deck.last_quota_reset = Some(reset);
  deck
}

/// User 1 whose streak was last extended at `last`
pub fn user_with_streak(streak: i64, last: DateTime<Utc>) -> User {
  let mut user = User::new("Lan".to_string(), "lan@example.com".to_string());
  user.id = 1;
  user.streak = streak;
  user.last_streak_at = Some(last);
  user
}
