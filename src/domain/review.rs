use serde::{Deserialize, Serialize};

/// One graded answer within a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
  pub card_id: i64,
  pub passed: bool,
}

/// Answers for a finished review round, as sent by the client.
///
/// `card_ids` and `is_correct` are parallel arrays; a card may appear more
/// than once if it was shown again within the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
  pub deck_id: i64,
  #[serde(default)]
  pub total_xp: i64,
  pub card_ids: Vec<i64>,
  pub is_correct: Vec<bool>,
}

impl ReviewSubmission {
  pub fn new(deck_id: i64, answers: &[Answer], total_xp: i64) -> Self {
    Self {
      deck_id,
      total_xp,
      card_ids: answers.iter().map(|a| a.card_id).collect(),
      is_correct: answers.iter().map(|a| a.passed).collect(),
    }
  }

  /// Pairs the parallel arrays; stops at the shorter one
  pub fn answers(&self) -> impl Iterator<Item = Answer> + '_ {
    self
      .card_ids
      .iter()
      .zip(&self.is_correct)
      .map(|(&card_id, &passed)| Answer { card_id, passed })
  }
}
