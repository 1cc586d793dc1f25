//! Error types for `rwis-olap-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::run::RunState;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date range: start {start} is after end {end}")]
  InvalidDateRange { start: NaiveDate, end: NaiveDate },

  /// The run state machine only moves forward, one step at a time.
  #[error("cannot advance run state past {0:?}")]
  TerminalState(RunState),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
