//! Experience, levels and daily streaks.

use chrono::{DateTime, Utc};

use crate::clock::DayBoundary;
use crate::config::ProgressParams;
use crate::domain::User;

/// How an award affected the user's streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
  /// First recorded activity
  Started,
  /// Activity again on the same day
  Unchanged,
  /// Activity on the day after the last one
  Extended,
  /// One or more days were skipped
  Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
  pub user: User,
  pub levels_gained: i64,
  pub streak_change: StreakChange,
}

/// Add `xp_gained` and roll the level and streak forward to `now`.
///
/// Negative awards are treated as zero; the caller is expected to reject
/// them before getting here.
pub fn award_xp(
  user: &User,
  xp_gained: i64,
  now: DateTime<Utc>,
  day: &DayBoundary,
  params: &ProgressParams,
) -> ProgressUpdate {
  let mut user = user.clone();

  if xp_gained < 0 {
    tracing::warn!("Ignoring negative XP award {} for user {}", xp_gained, user.id);
  }
  user.xp = user.xp.max(0).saturating_add(xp_gained.max(0));
  let levels_gained = level_up(&mut user, params);
  let streak_change = update_streak(&mut user, now, day);

  tracing::debug!(
    "User {} now level {} ({}/{} xp), streak {} ({:?})",
    user.id,
    user.level,
    user.xp,
    user.xp_to_level_up,
    user.streak,
    streak_change
  );

  ProgressUpdate {
    user,
    levels_gained,
    streak_change,
  }
}

/// Consume overflow XP one level at a time; returns the number of levels gained
fn level_up(user: &mut User, params: &ProgressParams) -> i64 {
  let increment = params.level_xp_increment.max(1);
  if user.xp_to_level_up <= 0 {
    tracing::warn!(
      "User {} has xp_to_level_up {}, resetting to {}",
      user.id,
      user.xp_to_level_up,
      params.base_xp_to_level_up
    );
    user.xp_to_level_up = params.base_xp_to_level_up.max(1);
  }

  let mut gained = skip_levels(user, increment);
  while user.xp >= user.xp_to_level_up {
    user.xp -= user.xp_to_level_up;
    user.level = user.level.saturating_add(1);
    user.xp_to_level_up = user.xp_to_level_up.saturating_add(increment);
    gained += 1;
  }
  gained
}

/// Bulk-consume all but the last few affordable levels so huge awards do not
/// walk the threshold up one increment at a time
fn skip_levels(user: &mut User, increment: i64) -> i64 {
  let xp = user.xp as i128;
  let threshold = user.xp_to_level_up as i128;
  let step = increment as i128;
  // Cost of the next `k` levels: k * threshold + step * k * (k - 1) / 2
  let cost = |k: i128| k * threshold + step * k * (k - 1) / 2;

  let half = threshold as f64 - step as f64 / 2.0;
  let estimate = ((half * half + 2.0 * step as f64 * xp as f64).sqrt() - half) / step as f64;
  let mut k = (estimate.max(0.0) as i128).saturating_sub(2).max(0);
  while k > 0 && cost(k) > xp {
    k -= 1;
  }
  if k == 0 {
    return 0;
  }

  user.xp = (xp - cost(k)) as i64;
  user.xp_to_level_up = i64::try_from(threshold + k * step).unwrap_or(i64::MAX);
  let levels = i64::try_from(k).unwrap_or(i64::MAX);
  user.level = user.level.saturating_add(levels);
  levels
}

fn update_streak(user: &mut User, now: DateTime<Utc>, day: &DayBoundary) -> StreakChange {
  let change = match user.last_streak_at {
    None => StreakChange::Started,
    Some(last) => match day.days_between(last, now) {
      0 => StreakChange::Unchanged,
      1 => StreakChange::Extended,
      _ => StreakChange::Reset,
    },
  };

  match change {
    StreakChange::Unchanged => {
      // Repair a record that was never initialised properly
      user.streak = user.streak.max(1);
    }
    StreakChange::Extended => {
      user.streak = user.streak.max(0) + 1;
      user.last_streak_at = Some(now);
    }
    StreakChange::Started | StreakChange::Reset => {
      user.streak = 1;
      user.last_streak_at = Some(now);
    }
  }
  change
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{at, user_with_streak};

  fn award(user: &User, xp: i64, now: DateTime<Utc>) -> ProgressUpdate {
    award_xp(user, xp, now, &DayBoundary::utc(), &ProgressParams::default())
  }

  #[test]
  fn test_multi_level_up() {
    let mut user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    user.xp = 90;
    user.xp_to_level_up = 100;
    user.level = 1;

    let update = award(&user, 250, at(2024, 5, 1, 10, 0));

    assert_eq!(update.user.level, 3);
    assert_eq!(update.user.xp, 40);
    assert_eq!(update.user.xp_to_level_up, 300);
    assert_eq!(update.levels_gained, 2);
  }

  #[test]
  fn test_no_level_up_below_threshold() {
    let user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    let update = award(&user, 99, at(2024, 5, 1, 10, 0));

    assert_eq!(update.user.level, 1);
    assert_eq!(update.user.xp, 99);
    assert_eq!(update.levels_gained, 0);
  }

  #[test]
  fn test_exact_threshold_levels_up() {
    let user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    let update = award(&user, 100, at(2024, 5, 1, 10, 0));

    assert_eq!(update.user.level, 2);
    assert_eq!(update.user.xp, 0);
    assert_eq!(update.user.xp_to_level_up, 200);
  }

  #[test]
  fn test_xp_stays_below_threshold_after_huge_award() {
    let user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    let update = award(&user, 1_000_000, at(2024, 5, 1, 10, 0));

    assert!(update.user.xp < update.user.xp_to_level_up);
    assert!(update.user.level > 100);
  }

  #[test]
  fn test_max_award_saturates() {
    let mut user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    user.xp = 50;
    let update = award(&user, i64::MAX, at(2024, 5, 1, 10, 0));

    assert!(update.user.xp >= 0);
    assert!(update.user.xp < update.user.xp_to_level_up);
    assert_eq!(update.user.level, 1 + update.levels_gained);
    assert!(update.levels_gained > 1_000_000);
  }

  #[test]
  fn test_bulk_levels_match_stepwise() {
    // 100 + 200 + ... + 1000 = 5500, plus 37 left over
    let user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    let update = award(&user, 5537, at(2024, 5, 1, 10, 0));

    assert_eq!(update.user.level, 11);
    assert_eq!(update.user.xp, 37);
    assert_eq!(update.user.xp_to_level_up, 1100);
    assert_eq!(update.levels_gained, 10);
  }

  #[test]
  fn test_negative_award_ignored() {
    let mut user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    user.xp = 50;
    let update = award(&user, -30, at(2024, 5, 1, 10, 0));
    assert_eq!(update.user.xp, 50);
  }

  #[test]
  fn test_broken_threshold_is_repaired() {
    let mut user = user_with_streak(1, at(2024, 5, 1, 9, 0));
    user.xp_to_level_up = 0;
    let update = award(&user, 150, at(2024, 5, 1, 10, 0));

    assert_eq!(update.user.level, 2);
    assert_eq!(update.user.xp, 50);
    assert_eq!(update.user.xp_to_level_up, 200);
  }

  #[test]
  fn test_streak_extends_next_day() {
    let user = user_with_streak(4, at(2024, 5, 1, 22, 0));
    let now = at(2024, 5, 2, 7, 0);
    let update = award(&user, 10, now);

    assert_eq!(update.user.streak, 5);
    assert_eq!(update.user.last_streak_at, Some(now));
    assert_eq!(update.streak_change, StreakChange::Extended);
  }

  #[test]
  fn test_streak_same_day_unchanged() {
    let last = at(2024, 5, 2, 7, 0);
    let user = user_with_streak(5, last);
    let update = award(&user, 10, at(2024, 5, 2, 23, 0));

    assert_eq!(update.user.streak, 5);
    assert_eq!(update.user.last_streak_at, Some(last));
    assert_eq!(update.streak_change, StreakChange::Unchanged);
  }

  #[test]
  fn test_streak_extend_then_same_day() {
    let user = user_with_streak(2, at(2024, 5, 1, 9, 0));
    let first = award(&user, 10, at(2024, 5, 2, 9, 0));
    let second = award(&first.user, 10, at(2024, 5, 2, 18, 0));

    assert_eq!(first.user.streak, 3);
    assert_eq!(second.user.streak, 3);
  }

  #[test]
  fn test_streak_resets_after_skipped_days() {
    let user = user_with_streak(9, at(2024, 5, 1, 9, 0));
    let now = at(2024, 5, 4, 9, 0);
    let update = award(&user, 10, now);

    assert_eq!(update.user.streak, 1);
    assert_eq!(update.user.last_streak_at, Some(now));
    assert_eq!(update.streak_change, StreakChange::Reset);
  }

  #[test]
  fn test_streak_starts_for_new_user() {
    let user = User::new("Hoa".to_string(), "hoa@example.com".to_string());
    let now = at(2024, 5, 4, 9, 0);
    let update = award(&user, 0, now);

    assert_eq!(update.user.streak, 1);
    assert_eq!(update.user.last_streak_at, Some(now));
    assert_eq!(update.streak_change, StreakChange::Started);
  }

  #[test]
  fn test_streak_clock_moved_backwards_resets() {
    let user = user_with_streak(3, at(2024, 5, 4, 9, 0));
    let update = award(&user, 0, at(2024, 5, 2, 9, 0));
    assert_eq!(update.user.streak, 1);
  }

  #[test]
  fn test_streak_uses_local_day() {
    // 16:30 and 17:30 UTC are different days at UTC+7
    let user = user_with_streak(2, at(2024, 5, 1, 16, 30));
    let day = DayBoundary::from_offset_minutes(7 * 60).unwrap();
    let update = award_xp(&user, 0, at(2024, 5, 1, 17, 30), &day, &ProgressParams::default());

    assert_eq!(update.user.streak, 3);
  }
}
