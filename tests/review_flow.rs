//! A week of reviews driven through the public engine API, the way the
//! service layer uses it: load snapshots, start, grade, persist, repeat.

use chrono::{DateTime, Duration, TimeZone, Utc};

use vietcard::clock::FixedClock;
use vietcard::config::{parse_engine_config, EngineConfig};
use vietcard::domain::{Answer, Card, CardCategory, Deck, ReviewSubmission, User};
use vietcard::engine::{ReviewEngine, ReviewError};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(year, month, day, hour, 0, 0)
    .single()
    .expect("valid timestamp")
}

fn deck_snapshot() -> Deck {
  serde_json::from_str(
    r#"{
      "id": 10,
      "user_id": 1,
      "name": "Tiếng Việt 1",
      "max_new_cards": 20,
      "max_review_cards": 100,
      "cur_new_cards": 18,
      "cur_review_cards": 0,
      "last_review": "2024-05-01T06:00:00Z"
    }"#,
  )
  .expect("deck snapshot")
}

fn card_snapshots() -> Vec<Card> {
  (1..=5)
    .map(|id| {
      let mut card = Card::new(10, 1, format!("từ {}", id), format!("word {}", id), vec![]);
      card.id = id;
      card
    })
    .collect()
}

/// Persist the engine's output back into the "store"
fn save(cards: &mut [Card], updated: &[Card]) {
  for card in updated {
    if let Some(slot) = cards.iter_mut().find(|c| c.id == card.id) {
      *slot = card.clone();
    }
  }
}

fn answer_all(ids: &[i64], passed: bool) -> Vec<Answer> {
  ids.iter().map(|&card_id| Answer { card_id, passed }).collect()
}

#[test]
fn remaining_new_allowance_is_respected() {
  let engine = ReviewEngine::with_clock(EngineConfig::default(), FixedClock::new(at(2024, 5, 1, 19)));
  let start = engine.start_session(&deck_snapshot(), &card_snapshots());

  assert_eq!(start.session.counts.new, 2);
  assert_eq!(start.session.card_ids(), vec![1, 2]);
  assert_eq!(start.deck.cur_new_cards, 18);
}

#[test]
fn week_of_reviews() {
  let config = parse_engine_config("[engine.deck]\nmax_new_cards = 2\n").expect("config");
  let engine = ReviewEngine::with_clock(config, FixedClock::new(at(2024, 5, 1, 8)));

  let mut deck = deck_snapshot();
  deck.max_new_cards = 2;
  deck.cur_new_cards = 0;
  deck.last_quota_reset = Some(at(2024, 4, 30, 8));
  let mut cards = card_snapshots();
  let mut user = User::new("Lan".to_string(), "lan@example.com".to_string());
  user.id = 1;

  let mut shown_new = 0;
  for day in 0..7 {
    let start = engine.start_session(&deck, &cards);
    deck = start.deck;

    let ids = start.session.card_ids();
    shown_new += start.session.counts.new;
    assert!(start.session.counts.new <= 2);

    if !ids.is_empty() {
      // Miss everything on day 2, get everything right otherwise
      let passed = day != 2;
      let submission = ReviewSubmission::new(deck.id, &answer_all(&ids, passed), 10 * ids.len() as i64);
      let outcome = engine.grade(&deck, &cards, &user, &submission).expect("grade");
      save(&mut cards, &outcome.cards);
      deck = outcome.deck;
      user = outcome.progress.user;

      if !passed {
        assert!(outcome.cards.iter().all(|c| c.repetitions == 0 && c.interval_days == 1));
      }
    }

    engine.clock().advance(Duration::days(1));
  }

  // All five cards were introduced, never more than two a day
  assert_eq!(shown_new, 5);
  assert!(cards.iter().all(|c| !c.is_new()));
  // Nothing was due on the last two days, so the streak stopped at day five
  assert_eq!(user.streak, 5);
  assert!(user.xp < user.xp_to_level_up);
  assert!(cards.iter().all(|c| c.ease_factor >= 1.3));
}

#[test]
fn lapsed_card_returns_next_day_as_red() {
  let engine = ReviewEngine::with_clock(EngineConfig::default(), FixedClock::new(at(2024, 5, 2, 9)));
  let mut deck = deck_snapshot();
  deck.cur_new_cards = 0;
  let mut cards = card_snapshots();
  let user = User::new("Lan".to_string(), "lan@example.com".to_string());

  let submission = ReviewSubmission::new(deck.id, &[Answer { card_id: 3, passed: false }], 0);
  let outcome = engine.grade(&deck, &cards, &user, &submission).expect("grade");
  save(&mut cards, &outcome.cards);
  // Failures consume no allowance
  assert_eq!(outcome.deck.cur_new_cards, 0);
  assert!(!outcome.next_session.card_ids().contains(&3));

  engine.clock().advance(Duration::days(1));
  let start = engine.start_session(&outcome.deck, &cards);
  let entry = start
    .session
    .entries
    .iter()
    .find(|e| e.card_id == 3)
    .expect("lapsed card is due");
  assert_eq!(entry.category, CardCategory::Lapsed);
  assert_eq!(entry.category.color(), "red");
}

#[test]
fn invalid_submission_changes_nothing() {
  let engine = ReviewEngine::with_clock(EngineConfig::default(), FixedClock::new(at(2024, 5, 2, 9)));
  let deck = deck_snapshot();
  let cards = card_snapshots();
  let user = User::new("Lan".to_string(), "lan@example.com".to_string());

  let submission = ReviewSubmission {
    deck_id: deck.id,
    total_xp: 10,
    card_ids: vec![1, 2],
    is_correct: vec![true],
  };
  let err = engine.grade(&deck, &cards, &user, &submission).unwrap_err();
  assert_eq!(err, ReviewError::LengthMismatch { cards: 2, outcomes: 1 });
  assert_eq!(err.to_string(), "Submission has 2 card ids but 1 outcomes");
}
