//! Due-ness and category of a single card on a given day.

use chrono::{DateTime, Utc};

use crate::clock::DayBoundary;
use crate::domain::{Card, CardCategory};

/// Whether `card` should be offered on the calendar day containing `now`.
///
/// Due-ness is compared at day granularity: a card due at 23:00 is already
/// due at 08:00 the same day. Never-reviewed cards are always due.
pub fn is_due(card: &Card, now: DateTime<Utc>, day: &DayBoundary) -> bool {
  if card.is_new() {
    return true;
  }
  match card.next_review {
    Some(next_review) => day.day_of(next_review) <= day.day_of(now),
    // Reviewed but never scheduled: treat as overdue rather than losing it
    None => true,
  }
}

/// Category of a card regardless of due-ness
pub fn category(card: &Card) -> CardCategory {
  if card.is_new() {
    CardCategory::New
  } else if card.repetitions == 0 {
    CardCategory::Lapsed
  } else {
    CardCategory::Mature
  }
}

/// Classify a card for today's session. `None` means not due.
pub fn classify(card: &Card, now: DateTime<Utc>, day: &DayBoundary) -> Option<CardCategory> {
  is_due(card, now, day).then(|| category(card))
}
