//! [`Warehouse`] - the star-schema (OLAP) destination database.

use std::path::Path;

use rwis_olap_core::dimension::{FactRow, IssueReport, IssueReportRow, Resident, TimeRow};

use crate::{
  Error, Result,
  encode::{RawIssueReport, RawIssueReportRow, decode_date, encode_date, encode_timestamp},
  schema::{EXPECTED_COLUMNS, PRAGMAS, SCHEMA},
};

/// Row counts of the four warehouse tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
  pub time:          usize,
  pub residents:     usize,
  pub issue_reports: usize,
  pub facts:         usize,
}

impl TableCounts {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// The destination database, backed by a single SQLite file.
///
/// Data-carrying statements are always parameter-bound. Write methods run on
/// whatever transaction is open on the connection; the pipeline opens one
/// with [`Warehouse::begin`] and ends it with [`Warehouse::commit`] or
/// [`Warehouse::rollback`].
pub struct Warehouse {
  conn: tokio_rusqlite::Connection,
}

impl Warehouse {
  /// Open (or create) a warehouse at `path`. Does not touch the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::configure(conn).await
  }

  /// Open an in-memory warehouse - useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::configure(conn).await
  }

  async fn configure(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  // ── Schema ────────────────────────────────────────────────────────────────

  /// Create any missing tables, then check every table has the columns the
  /// migration relies on.
  pub async fn init_schema(&self) -> Result<()> {
    let missing: Option<(&'static str, &'static str)> = self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;

        for (table, columns) in EXPECTED_COLUMNS {
          let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
          let present = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          if let Some(column) = columns.iter().find(|c| !present.iter().any(|p| p.as_str() == **c)) {
            return Ok(Some((*table, *column)));
          }
        }
        Ok(None)
      })
      .await?;

    match missing {
      Some((table, column)) => Err(Error::SchemaMismatch { table, column }),
      None => Ok(()),
    }
  }

  // ── Transaction boundary ──────────────────────────────────────────────────

  /// Open the run's write transaction. Takes the write lock up front.
  pub async fn begin(&self) -> Result<()> { self.exec("BEGIN IMMEDIATE").await }

  pub async fn commit(&self) -> Result<()> { self.exec("COMMIT").await }

  pub async fn rollback(&self) -> Result<()> { self.exec("ROLLBACK").await }

  async fn exec(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Loads ─────────────────────────────────────────────────────────────────

  /// Insert day rows, skipping dates already present.
  ///
  /// Returns the number of rows actually inserted.
  pub async fn insert_time_rows(&self, rows: Vec<TimeRow>) -> Result<usize> {
    if rows.is_empty() {
      return Ok(0);
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT OR IGNORE INTO dim_time (date, day, month, year) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut inserted = 0;
        for row in &rows {
          inserted += stmt.execute(rusqlite::params![
            encode_date(row.date),
            row.day,
            row.month,
            row.year,
          ])?;
        }
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  /// Insert residents keyed by their source id.
  pub async fn insert_residents(&self, residents: Vec<Resident>) -> Result<usize> {
    if residents.is_empty() {
      return Ok(0);
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("INSERT INTO dim_resident (id, name) VALUES (?1, ?2)")?;
        let mut inserted = 0;
        for resident in &residents {
          inserted += stmt.execute(rusqlite::params![resident.id, resident.name])?;
        }
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  /// Insert issue reports; each receives a fresh surrogate key.
  pub async fn insert_issue_reports(&self, reports: Vec<IssueReport>) -> Result<usize> {
    if reports.is_empty() {
      return Ok(0);
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO dim_issue_report (
             resident_id, title, description, created_at, updated_at,
             status, approval_status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut inserted = 0;
        for report in &reports {
          inserted += stmt.execute(rusqlite::params![
            report.resident_id,
            report.title,
            report.description,
            encode_timestamp(report.created_at),
            encode_timestamp(report.updated_at),
            report.status,
            report.approval_status,
          ])?;
        }
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  /// Join the three dimensions into `fact_issue_report`.
  ///
  /// Issue reports whose created date has no `dim_time` row, or whose
  /// resident has no `dim_resident` row, are skipped.
  pub async fn build_facts(&self) -> Result<usize> {
    let inserted = self
      .conn
      .call(|conn| {
        Ok(conn.execute(
          "INSERT INTO fact_issue_report (dim_time_id, dim_resident_id, dim_issue_report_id)
           SELECT t.id, r.id, ir.id
           FROM dim_issue_report ir
           JOIN dim_time     t ON date(ir.created_at) = t.date
           JOIN dim_resident r ON ir.resident_id      = r.id
           WHERE NOT EXISTS (
             SELECT 1 FROM fact_issue_report f WHERE f.dim_issue_report_id = ir.id
           )
           ORDER BY ir.id",
          [],
        )?)
      })
      .await?;
    Ok(inserted)
  }

  /// Issue reports that have no fact row.
  pub async fn unmatched_issue_reports(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM dim_issue_report ir
           WHERE NOT EXISTS (
             SELECT 1 FROM fact_issue_report f WHERE f.dim_issue_report_id = ir.id
           )",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn counts(&self) -> Result<TableCounts> {
    let (time, residents, issue_reports, facts): (i64, i64, i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT (SELECT COUNT(*) FROM dim_time),
                  (SELECT COUNT(*) FROM dim_resident),
                  (SELECT COUNT(*) FROM dim_issue_report),
                  (SELECT COUNT(*) FROM fact_issue_report)",
          [],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    Ok(TableCounts {
      time:          time as usize,
      residents:     residents as usize,
      issue_reports: issue_reports as usize,
      facts:         facts as usize,
    })
  }

  /// The time dimension ordered by date, with surrogate keys.
  pub async fn time_rows(&self) -> Result<Vec<(i64, TimeRow)>> {
    let raws: Vec<(i64, String, u32, u32, i32)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, date, day, month, year FROM dim_time ORDER BY date")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(id, date, day, month, year)| {
        Ok((id, TimeRow { date: decode_date(&date)?, day, month, year }))
      })
      .collect()
  }

  pub async fn residents(&self) -> Result<Vec<Resident>> {
    let residents = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM dim_resident ORDER BY id")?;
        let rows = stmt
          .query_map([], |r| Ok(Resident { id: r.get(0)?, name: r.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(residents)
  }

  pub async fn issue_reports(&self) -> Result<Vec<IssueReportRow>> {
    let raws: Vec<RawIssueReportRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, resident_id, title, description, created_at, updated_at,
                  status, approval_status
           FROM dim_issue_report ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(RawIssueReportRow {
              id:     r.get(0)?,
              report: RawIssueReport {
                resident_id:     r.get(1)?,
                title:           r.get(2)?,
                description:     r.get(3)?,
                created_at:      r.get(4)?,
                updated_at:      r.get(5)?,
                status:          r.get(6)?,
                approval_status: r.get(7)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIssueReportRow::into_row).collect()
  }

  pub async fn facts(&self) -> Result<Vec<FactRow>> {
    let facts = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, dim_time_id, dim_resident_id, dim_issue_report_id
           FROM fact_issue_report ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(FactRow {
              id:              r.get(0)?,
              time_id:         r.get(1)?,
              resident_id:     r.get(2)?,
              issue_report_id: r.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(facts)
  }
}
