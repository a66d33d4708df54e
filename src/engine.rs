//! Review session lifecycle over caller-supplied snapshots.
//!
//! The engine never loads or stores anything. Callers hand it the entities
//! they read from storage and persist what it hands back; applying those
//! writes atomically per entity is the caller's job.

use std::collections::HashMap;

use thiserror::Error;

use crate::clock::{Clock, DayBoundary, SystemClock};
use crate::config::EngineConfig;
use crate::domain::{Card, Deck, ReviewSubmission, User};
use crate::progress::{award_xp, ProgressUpdate};
use crate::srs::session_builder::{build_session, ReviewSession, SessionCounts, SessionQuota};
use crate::srs::{advance, record_answer, remaining_quota, rollover_if_new_day};

/// Reasons a graded submission is refused before any state changes
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReviewError {
  #[error("No cards in submission")]
  EmptySubmission,

  #[error("Submission has {cards} card ids but {outcomes} outcomes")]
  LengthMismatch { cards: usize, outcomes: usize },

  #[error("Submission is for deck {submitted}, not deck {deck}")]
  WrongDeck { submitted: i64, deck: i64 },

  #[error("Card {0} does not exist in the deck")]
  UnknownCard(i64),

  #[error("Negative XP award: {0}")]
  NegativeXp(i64),
}

/// A deck after rollover together with the session to present
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
  pub deck: Deck,
  pub session: ReviewSession,
}

/// Everything that changed because of one graded submission
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
  /// Each graded card once, in order of first appearance
  pub cards: Vec<Card>,
  pub deck: Deck,
  pub progress: ProgressUpdate,
  /// What to present next with the allowance left today
  pub next_session: ReviewSession,
}

/// One deck's share of the all-decks review overview
#[derive(Debug, Clone, PartialEq)]
pub struct DeckReview {
  pub deck_id: i64,
  pub session: ReviewSession,
}

pub struct ReviewEngine<C: Clock = SystemClock> {
  config: EngineConfig,
  day: DayBoundary,
  clock: C,
}

impl ReviewEngine<SystemClock> {
  pub fn new(config: EngineConfig) -> Self {
    Self::with_clock(config, SystemClock)
  }
}

impl<C: Clock> ReviewEngine<C> {
  pub fn with_clock(config: EngineConfig, clock: C) -> Self {
    let day = config.day_boundary();
    Self { config, day, clock }
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  /// Roll the deck over to today and pick what to show from its cards
  pub fn start_session(&self, deck: &Deck, cards: &[Card]) -> SessionStart {
    let now = self.clock.now();
    let deck = rollover_if_new_day(deck, now, &self.day);
    let session = build_session(
      &deck_cards(&deck, cards),
      remaining_quota(&deck),
      now,
      &self.day,
      self.config.session_order,
    );
    SessionStart { deck, session }
  }

  /// Apply a round of answers to a deck's cards and the user's progress.
  ///
  /// Validation happens up front, so an error means nothing was advanced.
  pub fn grade(
    &self,
    deck: &Deck,
    cards: &[Card],
    user: &User,
    submission: &ReviewSubmission,
  ) -> Result<GradeOutcome, ReviewError> {
    validate_submission(deck, cards, submission)?;

    let now = self.clock.now();
    let mut deck = rollover_if_new_day(deck, now, &self.day);

    let mut current: Vec<Card> = deck_cards(&deck, cards);
    let positions: HashMap<i64, usize> = current
      .iter()
      .enumerate()
      .map(|(i, card)| (card.id, i))
      .collect();
    let mut graded_order: Vec<usize> = Vec::new();
    let mut passed_count = 0usize;

    for answer in submission.answers() {
      let Some(&pos) = positions.get(&answer.card_id) else {
        return Err(ReviewError::UnknownCard(answer.card_id));
      };
      let updated = advance(&current[pos], answer.passed, now, &self.config.sm2).apply_to(&current[pos]);
      deck = record_answer(&deck, &updated, answer.passed);
      current[pos] = updated;
      if !graded_order.contains(&pos) {
        graded_order.push(pos);
      }
      if answer.passed {
        passed_count += 1;
      }
    }

    tracing::debug!(
      "Graded {} answers ({} correct) on deck {}; today {} new, {} review",
      submission.card_ids.len(),
      passed_count,
      deck.id,
      deck.cur_new_cards,
      deck.cur_review_cards
    );

    let next_session = build_session(
      &current,
      remaining_quota(&deck),
      now,
      &self.day,
      self.config.session_order,
    );
    let progress = award_xp(user, submission.total_xp, now, &self.day, &self.config.progress);
    let cards = graded_order.into_iter().map(|pos| current[pos].clone()).collect();

    Ok(GradeOutcome {
      cards,
      deck,
      progress,
      next_session,
    })
  }

  /// Due cards across all of a user's decks under the user's own caps.
  ///
  /// The caps are shared: whatever one deck admits is no longer available to
  /// the decks after it.
  pub fn overview(&self, user: &User, decks: &[(Deck, Vec<Card>)]) -> Vec<DeckReview> {
    let now = self.clock.now();
    let quota = SessionQuota::new(user.max_new_cards_learn, user.max_cards_review);
    let mut used = SessionCounts::default();

    decks
      .iter()
      .map(|(deck, cards)| {
        let session = build_session(
          &deck_cards(deck, cards),
          quota.less(&used),
          now,
          &self.day,
          self.config.session_order,
        );
        used = used.add(&session.counts);
        DeckReview {
          deck_id: deck.id,
          session,
        }
      })
      .collect()
  }
}

/// Only the cards that actually belong to `deck`
fn deck_cards(deck: &Deck, cards: &[Card]) -> Vec<Card> {
  cards.iter().filter(|c| c.deck_id == deck.id).cloned().collect()
}

fn validate_submission(deck: &Deck, cards: &[Card], submission: &ReviewSubmission) -> Result<(), ReviewError> {
  if submission.deck_id != deck.id {
    return Err(ReviewError::WrongDeck {
      submitted: submission.deck_id,
      deck: deck.id,
    });
  }
  if submission.card_ids.is_empty() {
    return Err(ReviewError::EmptySubmission);
  }
  if submission.card_ids.len() != submission.is_correct.len() {
    return Err(ReviewError::LengthMismatch {
      cards: submission.card_ids.len(),
      outcomes: submission.is_correct.len(),
    });
  }
  if submission.total_xp < 0 {
    return Err(ReviewError::NegativeXp(submission.total_xp));
  }
  if let Some(&missing) = submission
    .card_ids
    .iter()
    .find(|&&id| !cards.iter().any(|c| c.id == id && c.deck_id == deck.id))
  {
    return Err(ReviewError::UnknownCard(missing));
  }
  Ok(())
}
