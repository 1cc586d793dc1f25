//! The inclusive window of days covered by the time dimension.
//!
//! Issue reports created outside this window get no fact row, so the window
//! is part of the run's configuration rather than a literal in the loader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Inclusive `[start, end]` range of calendar days. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
  start: NaiveDate,
  end:   NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
  start: NaiveDate,
  end:   NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
  type Error = Error;

  fn try_from(raw: RawDateRange) -> Result<Self> { Self::new(raw.start, raw.end) }
}

impl Default for DateRange {
  /// Five years: 2020-01-01 through 2024-12-31.
  fn default() -> Self {
    Self {
      start: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid literal date"),
      end:   NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid literal date"),
    }
  }
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidDateRange { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> NaiveDate { self.start }

  pub fn end(&self) -> NaiveDate { self.end }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  /// Number of days in the range, both ends included.
  pub fn len(&self) -> usize {
    ((self.end - self.start).num_days() + 1) as usize
  }

  /// A range always holds at least one day.
  pub fn is_empty(&self) -> bool { false }

  /// Every day of the range in ascending order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
    let end = self.end;
    self.start.iter_days().take_while(move |d| *d <= end)
  }
}

impl std::fmt::Display for DateRange {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}..={}", self.start, self.end)
  }
}
