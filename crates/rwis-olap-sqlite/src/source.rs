//! [`SourceDb`] - read-only access to the operational (OLTP) database.

use std::path::Path;

use rusqlite::OpenFlags;
use rwis_olap_core::dimension::{IssueReport, Resident};

use crate::{Result, encode::RawIssueReport};

/// The operational database residents and issue reports are extracted from.
///
/// Opened read-only; the migration never writes to it.
pub struct SourceDb {
  conn: tokio_rusqlite::Connection,
}

impl SourceDb {
  /// Open an existing source database. Fails if the file does not exist.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(Self { conn })
  }

  /// All residents, ordered by id.
  pub async fn residents(&self) -> Result<Vec<Resident>> {
    let residents = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, full_name FROM resident ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(Resident { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(residents)
  }

  /// All issue reports, in the order the source returns them.
  pub async fn issue_reports(&self) -> Result<Vec<IssueReport>> {
    let raws: Vec<RawIssueReport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT resident_id, title, description, created_at, updated_at,
                  status, approval_status
           FROM issue_report",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawIssueReport {
              resident_id:     row.get(0)?,
              title:           row.get(1)?,
              description:     row.get(2)?,
              created_at:      row.get(3)?,
              updated_at:      row.get(4)?,
              status:          row.get(5)?,
              approval_status: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIssueReport::into_issue_report).collect()
  }
}
