//! Per-deck daily allowance bookkeeping.

use chrono::{DateTime, Utc};

use crate::clock::DayBoundary;
use crate::domain::{Card, Deck};
use crate::srs::session_builder::SessionQuota;

/// Zero the deck's daily counters if `now` falls on a different calendar day
/// than the last reset. Same-day calls return the deck unchanged.
pub fn rollover_if_new_day(deck: &Deck, now: DateTime<Utc>, day: &DayBoundary) -> Deck {
  if let Some(last_reset) = deck.last_quota_reset {
    if day.same_day(last_reset, now) {
      return deck.clone();
    }
  }

  tracing::debug!(
    "Resetting daily counters for deck {} (was {} new, {} review)",
    deck.id,
    deck.cur_new_cards,
    deck.cur_review_cards
  );

  Deck {
    cur_new_cards: 0,
    cur_review_cards: 0,
    last_quota_reset: Some(now),
    ..deck.clone()
  }
}

/// What the deck may still present today
pub fn remaining_quota(deck: &Deck) -> SessionQuota {
  SessionQuota::new(
    deck.max_new_cards - deck.cur_new_cards,
    deck.max_review_cards - deck.cur_review_cards,
  )
}

/// Charge one graded answer against the deck's counters.
///
/// `graded` is the card after the review was applied. Only correct answers
/// consume allowance: a card's first ever review counts as a new card learned,
/// any later one as a review. Failed answers leave the counters alone.
pub fn record_answer(deck: &Deck, graded: &Card, passed: bool) -> Deck {
  let mut deck = deck.clone();
  if !passed {
    return deck;
  }
  if graded.total_reviews == 1 {
    deck.cur_new_cards += 1;
    deck.total_learned_cards += 1;
  } else {
    deck.cur_review_cards += 1;
  }
  deck
}
