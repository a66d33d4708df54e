//! Time sources and calendar-day arithmetic.
//!
//! Every day-granular decision in the engine (due-ness, quota rollover,
//! streak continuation) goes through [`DayBoundary`], so all of them agree on
//! where midnight falls. "Now" is always passed in explicitly; [`Clock`] is the
//! seam that lets the engine run against a frozen time in tests.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use std::sync::Mutex;

/// Source of the current instant.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
  now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self { now: Mutex::new(now) }
  }

  /// Move the clock to an absolute instant
  pub fn set(&self, now: DateTime<Utc>) {
    let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = now;
  }

  /// Move the clock forward (or backward, for negative durations)
  pub fn advance(&self, by: Duration) {
    let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard += by;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> DateTime<Utc> {
    (**self).now()
  }
}

/// Where calendar days begin, expressed as a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
  offset: FixedOffset,
}

impl Default for DayBoundary {
  fn default() -> Self {
    Self::utc()
  }
}

impl DayBoundary {
  pub fn utc() -> Self {
    Self {
      offset: Utc.fix(),
    }
  }

  pub fn new(offset: FixedOffset) -> Self {
    Self { offset }
  }

  /// Returns None when the offset is not strictly within ±24h
  pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
    FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
  }

  pub fn offset(&self) -> FixedOffset {
    self.offset
  }

  /// The local calendar date an instant falls on
  pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&self.offset).date_naive()
  }

  /// Local midnight at the start of the day containing `ts`, as a UTC instant
  pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = self.day_of(ts).and_time(NaiveTime::MIN);
    // A fixed offset has no gaps or folds, so local midnight always maps to
    // exactly one instant.
    self
      .offset
      .from_local_datetime(&midnight)
      .single()
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or(ts)
  }

  pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    self.day_of(a) == self.day_of(b)
  }

  /// Whole calendar days from `earlier` to `later` (negative if `later` is before)
  pub fn days_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (self.day_of(later) - self.day_of(earlier)).num_days()
  }
}
