//! The forward-only state machine of a migration run.
//!
//! A run moves `Init → TimeLoaded → ResidentsLoaded → IssuesLoaded →
//! FactsBuilt → Committed` and never re-enters an earlier state. Each
//! transition is driven by exactly one [`Stage`].

use serde::{Deserialize, Serialize};

use crate::{Error, Result, range::DateRange};

// ─── Stages ──────────────────────────────────────────────────────────────────

/// A unit of work in the pipeline. Used to label progress and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Connect,
  Schema,
  /// Opening the warehouse write transaction.
  Begin,
  TimeDimension,
  Residents,
  IssueReports,
  Facts,
  Commit,
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Stage::Connect => "connect",
      Stage::Schema => "schema initialisation",
      Stage::Begin => "transaction start",
      Stage::TimeDimension => "time dimension generation",
      Stage::Residents => "resident load",
      Stage::IssueReports => "issue report load",
      Stage::Facts => "fact build",
      Stage::Commit => "commit",
    })
  }
}

// ─── States ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  /// Schema exists; no data written in this run yet.
  Init,
  TimeLoaded,
  ResidentsLoaded,
  IssuesLoaded,
  FactsBuilt,
  Committed,
}

impl RunState {
  /// The stage that moves the run out of this state, if any.
  pub fn next_stage(self) -> Option<Stage> {
    match self {
      RunState::Init => Some(Stage::TimeDimension),
      RunState::TimeLoaded => Some(Stage::Residents),
      RunState::ResidentsLoaded => Some(Stage::IssueReports),
      RunState::IssuesLoaded => Some(Stage::Facts),
      RunState::FactsBuilt => Some(Stage::Commit),
      RunState::Committed => None,
    }
  }

  /// Move to the following state.
  pub fn advance(self) -> Result<Self> {
    Ok(match self {
      RunState::Init => RunState::TimeLoaded,
      RunState::TimeLoaded => RunState::ResidentsLoaded,
      RunState::ResidentsLoaded => RunState::IssuesLoaded,
      RunState::IssuesLoaded => RunState::FactsBuilt,
      RunState::FactsBuilt => RunState::Committed,
      RunState::Committed => return Err(Error::TerminalState(self)),
    })
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Summary of a committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
  pub time_range:    DateRange,
  /// Days newly inserted; days already present are skipped.
  pub time_rows:     usize,
  pub residents:     usize,
  pub issue_reports: usize,
  pub facts:         usize,
  /// Issue reports with no fact row: created outside `time_range`, or
  /// referencing a resident that was not loaded.
  pub unmatched:     usize,
  pub state:         RunState,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn advance_walks_every_state_once() {
    let mut state = RunState::Init;
    let mut stages = vec![];
    while let Some(stage) = state.next_stage() {
      stages.push(stage);
      let next = state.advance().unwrap();
      assert!(next > state);
      state = next;
    }
    assert_eq!(state, RunState::Committed);
    assert_eq!(stages, vec![
      Stage::TimeDimension,
      Stage::Residents,
      Stage::IssueReports,
      Stage::Facts,
      Stage::Commit,
    ]);
  }

  #[test]
  fn committed_is_terminal() {
    let err = RunState::Committed.advance().unwrap_err();
    assert!(matches!(err, Error::TerminalState(RunState::Committed)));
  }

  #[test]
  fn stage_names_are_readable() {
    assert_eq!(Stage::Residents.to_string(), "resident load");
    assert_eq!(Stage::Facts.to_string(), "fact build");
    assert_eq!(Stage::Begin.to_string(), "transaction start");
  }
}
