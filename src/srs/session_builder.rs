//! Bounded daily review sessions.
//!
//! A session is built greedily: candidates are walked in a deterministic
//! order, each is classified, and it is admitted while its category still has
//! allowance left. New cards draw on the new-card allowance; lapsed and mature
//! cards each draw on the review allowance but are counted separately.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::DayBoundary;
use crate::config::SessionOrder;
use crate::domain::{Card, CardCategory};
use crate::srs::classifier::classify;

/// Remaining allowance per category for one session build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionQuota {
  pub new: i64,
  pub lapsed: i64,
  pub mature: i64,
}

impl SessionQuota {
  /// Lapsed and mature cards share the review cap but are limited separately.
  /// Negative allowances (already over budget) are treated as zero.
  pub fn new(quota_new: i64, quota_review: i64) -> Self {
    if quota_new < 0 || quota_review < 0 {
      tracing::warn!(
        "Clamping negative session quota (new={}, review={}) to zero",
        quota_new,
        quota_review
      );
    }
    let review = quota_review.max(0);
    Self {
      new: quota_new.max(0),
      lapsed: review,
      mature: review,
    }
  }

  pub fn limit(&self, category: CardCategory) -> i64 {
    match category {
      CardCategory::New => self.new,
      CardCategory::Lapsed => self.lapsed,
      CardCategory::Mature => self.mature,
    }
  }

  /// Allowance left after `used` has been admitted elsewhere
  pub fn less(&self, used: &SessionCounts) -> Self {
    Self {
      new: (self.new - used.new).max(0),
      lapsed: (self.lapsed - used.lapsed).max(0),
      mature: (self.mature - used.mature).max(0),
    }
  }
}

/// Admitted cards per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionCounts {
  #[serde(rename = "num_blue_cards")]
  pub new: i64,
  #[serde(rename = "num_red_cards")]
  pub lapsed: i64,
  #[serde(rename = "num_green_cards")]
  pub mature: i64,
}

impl SessionCounts {
  pub fn get(&self, category: CardCategory) -> i64 {
    match category {
      CardCategory::New => self.new,
      CardCategory::Lapsed => self.lapsed,
      CardCategory::Mature => self.mature,
    }
  }

  fn bump(&mut self, category: CardCategory) {
    match category {
      CardCategory::New => self.new += 1,
      CardCategory::Lapsed => self.lapsed += 1,
      CardCategory::Mature => self.mature += 1,
    }
  }

  pub fn total(&self) -> i64 {
    self.new + self.lapsed + self.mature
  }

  pub fn review(&self) -> i64 {
    self.lapsed + self.mature
  }

  pub fn add(&self, other: &SessionCounts) -> Self {
    Self {
      new: self.new + other.new,
      lapsed: self.lapsed + other.lapsed,
      mature: self.mature + other.mature,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionEntry {
  pub card_id: i64,
  #[serde(rename = "card_type")]
  pub category: CardCategory,
}

/// Cards to present, in presentation order, plus the session composition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewSession {
  pub entries: Vec<SessionEntry>,
  #[serde(flatten)]
  pub counts: SessionCounts,
}

impl ReviewSession {
  pub fn card_ids(&self) -> Vec<i64> {
    self.entries.iter().map(|e| e.card_id).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Candidates in the order they compete for allowance
pub fn order_candidates(cards: &[Card], order: SessionOrder) -> Vec<&Card> {
  let mut ordered: Vec<&Card> = cards.iter().collect();
  match order {
    SessionOrder::Collection => {}
    SessionOrder::DueFirst => {
      // Stable: equal keys keep collection order. Unscheduled cards sort first.
      ordered.sort_by_key(|card| if card.is_new() { None } else { card.next_review });
    }
  }
  ordered
}

/// Select at most `quota` cards from `cards` that are due on `now`'s day
pub fn build_session(
  cards: &[Card],
  quota: SessionQuota,
  now: DateTime<Utc>,
  day: &DayBoundary,
  order: SessionOrder,
) -> ReviewSession {
  let mut session = ReviewSession::default();
  let mut not_due = 0usize;
  let mut over_quota = 0usize;

  for card in order_candidates(cards, order) {
    let Some(category) = classify(card, now, day) else {
      not_due += 1;
      continue;
    };
    if session.counts.get(category) >= quota.limit(category) {
      over_quota += 1;
      continue;
    }
    session.counts.bump(category);
    session.entries.push(SessionEntry {
      card_id: card.id,
      category,
    });
  }

  tracing::debug!(
    "Built session: {} new, {} review ({} lapsed, {} mature; {} not due, {} over quota)",
    session.counts.new,
    session.counts.review(),
    session.counts.lapsed,
    session.counts.mature,
    not_due,
    over_quota
  );

  session
}
