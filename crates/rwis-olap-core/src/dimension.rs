//! Rows of the star schema.
//!
//! Source-side records (`Resident`, `IssueReport`) are copied verbatim into
//! their dimension tables. `TimeRow` is generated, and `FactRow` is produced
//! by the warehouse itself when the dimensions are joined.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ─── Time dimension ──────────────────────────────────────────────────────────

/// One calendar day, decomposed into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRow {
  pub date:  NaiveDate,
  pub day:   u32,
  pub month: u32,
  pub year:  i32,
}

impl TimeRow {
  pub fn from_date(date: NaiveDate) -> Self {
    Self { date, day: date.day(), month: date.month(), year: date.year() }
  }

  /// `true` when `day`/`month`/`year` describe `date` exactly.
  pub fn is_consistent(&self) -> bool {
    NaiveDate::from_ymd_opt(self.year, self.month, self.day) == Some(self.date)
  }
}

// ─── Resident dimension ──────────────────────────────────────────────────────

/// A resident as extracted from the source `resident` table.
///
/// `id` is the source identifier and is carried into the warehouse as the
/// dimension's surrogate key, so issue reports referencing it join directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
  pub id:   i64,
  pub name: String,
}

// ─── Issue-report dimension ──────────────────────────────────────────────────

/// An issue report as extracted from the source `issue_report` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
  /// Source resident id. Kept as a plain attribute, never rewritten.
  pub resident_id:     i64,
  pub title:           String,
  pub description:     String,
  pub created_at:      NaiveDateTime,
  pub updated_at:      NaiveDateTime,
  pub status:          String,
  pub approval_status: String,
}

impl IssueReport {
  /// The calendar day this report joins against in the time dimension.
  pub fn created_date(&self) -> NaiveDate { self.created_at.date() }
}

/// An issue report as stored in `dim_issue_report`, with its surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReportRow {
  pub id:     i64,
  #[serde(flatten)]
  pub report: IssueReport,
}

// ─── Fact ────────────────────────────────────────────────────────────────────

/// Links one issue report to its day and its resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
  pub id:              i64,
  pub time_id:         i64,
  pub resident_id:     i64,
  pub issue_report_id: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn time_row_decomposes_date() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let row = TimeRow::from_date(date);
    assert_eq!((row.day, row.month, row.year), (29, 2, 2024));
    assert!(row.is_consistent());
  }

  #[test]
  fn inconsistent_time_row_is_detected() {
    let mut row = TimeRow::from_date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    row.month = 7;
    assert!(!row.is_consistent());
  }

  #[test]
  fn created_date_truncates_timestamp() {
    let report = IssueReport {
      resident_id:     1,
      title:           "Leak".into(),
      description:     "...".into(),
      created_at:      NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap(),
      updated_at:      NaiveDate::from_ymd_opt(2023, 6, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap(),
      status:          "open".into(),
      approval_status: "pending".into(),
    };
    assert_eq!(report.created_date(), NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
  }
}
