//! Encoding and decoding helpers between the domain types and the text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` and timestamps as
//! `YYYY-MM-DD HH:MM:SS[.fraction]`, both of which SQLite's `date()` function
//! understands. The fact join relies on that.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rwis_olap_core::dimension::{IssueReport, IssueReportRow};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_timestamp(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, the same with a `T` separator,
/// RFC 3339, or a bare `YYYY-MM-DD` (midnight).
///
/// An RFC 3339 offset is dropped and the wall-clock time kept, so the stored
/// value and its calendar day match the source.
pub fn decode_timestamp(s: &str) -> Result<NaiveDateTime> {
  if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
    return Ok(ts);
  }
  if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(ts);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.naive_local());
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map(|d| d.and_time(NaiveTime::MIN))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a source `issue_report` row, timestamps still text.
pub struct RawIssueReport {
  pub resident_id:     i64,
  pub title:           String,
  pub description:     String,
  pub created_at:      String,
  pub updated_at:      String,
  pub status:          String,
  pub approval_status: String,
}

impl RawIssueReport {
  pub fn into_issue_report(self) -> Result<IssueReport> {
    Ok(IssueReport {
      resident_id:     self.resident_id,
      title:           self.title,
      description:     self.description,
      created_at:      decode_timestamp(&self.created_at)?,
      updated_at:      decode_timestamp(&self.updated_at)?,
      status:          self.status,
      approval_status: self.approval_status,
    })
  }
}

/// Raw values read from a `dim_issue_report` row.
pub struct RawIssueReportRow {
  pub id:     i64,
  pub report: RawIssueReport,
}

impl RawIssueReportRow {
  pub fn into_row(self) -> Result<IssueReportRow> {
    Ok(IssueReportRow { id: self.id, report: self.report.into_issue_report()? })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
  }

  #[test]
  fn timestamp_without_fraction_has_no_trailing_dot() {
    assert_eq!(encode_timestamp(ts(2023, 6, 1, 9, 30, 0)), "2023-06-01 09:30:00");
  }

  #[test]
  fn timestamp_keeps_fraction() {
    let t = ts(2023, 6, 1, 9, 30, 0) + chrono::Duration::milliseconds(250);
    let s = encode_timestamp(t);
    assert_eq!(s, "2023-06-01 09:30:00.250");
    assert_eq!(decode_timestamp(&s).unwrap(), t);
  }

  #[test]
  fn decode_accepts_iso_and_rfc3339() {
    assert_eq!(decode_timestamp("2023-06-01T09:30:00").unwrap(), ts(2023, 6, 1, 9, 30, 0));
    assert_eq!(
      decode_timestamp("2023-06-01T09:30:00+02:00").unwrap(),
      ts(2023, 6, 1, 9, 30, 0)
    );
    assert_eq!(
      decode_timestamp("2023-06-01T01:00:00+05:00").unwrap(),
      ts(2023, 6, 1, 1, 0, 0)
    );
  }

  #[test]
  fn decode_accepts_bare_date_as_midnight() {
    assert_eq!(decode_timestamp("2023-06-01").unwrap(), ts(2023, 6, 1, 0, 0, 0));
    assert_eq!(encode_timestamp(decode_timestamp("2023-06-02").unwrap()), "2023-06-02 00:00:00");
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_timestamp("yesterday"), Err(Error::DateParse(_))));
    assert!(matches!(decode_date("2023/06/01"), Err(Error::DateParse(_))));
  }
}
