//! The migration pipeline: schema, then four data stages inside one
//! warehouse transaction, then commit.
//!
//! Each stage is a free function over the two connection handles so it can
//! be exercised on its own. [`Pipeline`] sequences them through the
//! [`RunState`] machine and owns the transaction boundary: any failure rolls
//! back everything written during the run.

use rwis_olap_core::{
  dimension::TimeRow,
  range::DateRange,
  run::{RunReport, RunState, Stage},
};
use tracing::{debug, info, warn};

use crate::{Result, config::EtlConfig, source::SourceDb, warehouse::Warehouse};

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Insert one `dim_time` row per day of `range`. Returns rows newly inserted.
pub async fn load_time_dimension(warehouse: &Warehouse, range: DateRange) -> Result<usize> {
  let rows: Vec<TimeRow> = range.days().map(TimeRow::from_date).collect();
  let generated = rows.len();
  let inserted = warehouse.insert_time_rows(rows).await?;
  if inserted < generated {
    debug!(generated, inserted, "some days were already present in dim_time");
  }
  Ok(inserted)
}

/// Copy every source resident into `dim_resident`, keeping its id.
pub async fn load_residents(source: &SourceDb, warehouse: &Warehouse) -> Result<usize> {
  let residents = source.residents().await?;
  debug!(extracted = residents.len(), "residents extracted");
  warehouse.insert_residents(residents).await
}

/// Copy every source issue report into `dim_issue_report`.
pub async fn load_issue_reports(source: &SourceDb, warehouse: &Warehouse) -> Result<usize> {
  let reports = source.issue_reports().await?;
  debug!(extracted = reports.len(), "issue reports extracted");
  warehouse.insert_issue_reports(reports).await
}

/// Build fact rows. Returns `(facts, unmatched issue reports)`.
pub async fn build_facts(warehouse: &Warehouse) -> Result<(usize, usize)> {
  let facts = warehouse.build_facts().await?;
  let unmatched = warehouse.unmatched_issue_reports().await?;
  Ok((facts, unmatched))
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// One migration run from a source database into a warehouse.
pub struct Pipeline<'a> {
  source:     &'a SourceDb,
  warehouse:  &'a Warehouse,
  time_range: DateRange,
}

impl<'a> Pipeline<'a> {
  pub fn new(source: &'a SourceDb, warehouse: &'a Warehouse, time_range: DateRange) -> Self {
    Self { source, warehouse, time_range }
  }

  /// Run every stage and commit.
  ///
  /// The schema is created first, outside the data transaction. On error the
  /// transaction is rolled back and the error names the failing stage.
  pub async fn run(&self) -> Result<RunReport> {
    info!("Creating tables dim_time, dim_resident, dim_issue_report, fact_issue_report...");
    self.warehouse.init_schema().await.map_err(|e| e.in_stage(Stage::Schema))?;
    info!("Tables are ready");

    let mut report = RunReport {
      time_range:    self.time_range,
      time_rows:     0,
      residents:     0,
      issue_reports: 0,
      facts:         0,
      unmatched:     0,
      state:         RunState::Init,
    };

    self
      .warehouse
      .begin()
      .await
      .map_err(|e| e.in_stage(Stage::Begin))?;

    if let Err(err) = self.drive(&mut report).await {
      warn!(state = ?report.state, "run failed, rolling back");
      if let Err(rollback_err) = self.warehouse.rollback().await {
        tracing::error!("rollback failed: {rollback_err}");
      }
      return Err(err);
    }

    Ok(report)
  }

  async fn drive(&self, report: &mut RunReport) -> Result<()> {
    while let Some(stage) = report.state.next_stage() {
      self.run_stage(stage, report).await.map_err(|e| e.in_stage(stage))?;
      report.state = report.state.advance()?;
      debug!(state = ?report.state, "stage complete: {stage}");
    }
    Ok(())
  }

  async fn run_stage(&self, stage: Stage, report: &mut RunReport) -> Result<()> {
    match stage {
      Stage::TimeDimension => {
        info!("Generating time data for {}...", self.time_range);
        report.time_rows = load_time_dimension(self.warehouse, self.time_range).await?;
        info!(rows = report.time_rows, "Time data has been generated");
      }
      Stage::Residents => {
        info!("Moving resident data...");
        report.residents = load_residents(self.source, self.warehouse).await?;
        info!(rows = report.residents, "Resident data has been moved");
      }
      Stage::IssueReports => {
        info!("Moving issue report data...");
        report.issue_reports = load_issue_reports(self.source, self.warehouse).await?;
        info!(rows = report.issue_reports, "Issue report data has been moved");
      }
      Stage::Facts => {
        info!("Building fact table...");
        let (facts, unmatched) = build_facts(self.warehouse).await?;
        report.facts = facts;
        report.unmatched = unmatched;
        if unmatched > 0 {
          warn!(
            unmatched,
            "issue reports without a fact row (created outside {} or unknown resident)",
            self.time_range
          );
        }
        info!(rows = facts, "Fact table has been built");
      }
      Stage::Commit => {
        self.warehouse.commit().await?;
        info!("Warehouse committed");
      }
      // Handled before the transaction opens.
      Stage::Connect | Stage::Schema | Stage::Begin => {}
    }
    Ok(())
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Open both databases from `config` and run the migration once.
pub async fn migrate(config: &EtlConfig) -> Result<RunReport> {
  info!(path = ?config.source_path, "Opening source database");
  let source = SourceDb::open(&config.source_path)
    .await
    .map_err(|e| e.in_stage(Stage::Connect))?;

  info!(path = ?config.warehouse_path, "Opening warehouse database");
  let warehouse = Warehouse::open(&config.warehouse_path)
    .await
    .map_err(|e| e.in_stage(Stage::Connect))?;

  Pipeline::new(&source, &warehouse, config.time_range).run().await
}
