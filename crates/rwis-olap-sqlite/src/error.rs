//! Error type for `rwis-olap-sqlite`.

use rwis_olap_core::run::Stage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rwis_olap_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A table already exists but lacks a column the migration needs.
  #[error("table {table} exists without expected column {column:?}")]
  SchemaMismatch {
    table:  &'static str,
    column: &'static str,
  },

  /// Wraps whatever went wrong with the stage that was running.
  #[error("{stage} failed: {source}")]
  Stage {
    stage:  Stage,
    #[source]
    source: Box<Error>,
  },
}

impl Error {
  /// The stage that failed, when the error came out of a pipeline run.
  pub fn stage(&self) -> Option<Stage> {
    match self {
      Error::Stage { stage, .. } => Some(*stage),
      _ => None,
    }
  }

  pub(crate) fn in_stage(self, stage: Stage) -> Self {
    Error::Stage { stage, source: Box::new(self) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
