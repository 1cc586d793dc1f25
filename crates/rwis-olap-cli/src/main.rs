//! `rwis-olap` - one-shot migration of the RWIS operational database into
//! its star-schema warehouse.
//!
//! Reads `config.toml` (or the path given with `--config`), overlaid with
//! `RWIS_`-prefixed environment variables:
//!
//! ```toml
//! source_path    = "rwis3.db"
//! warehouse_path = "rwis3-olap.db"
//!
//! [time_range]
//! start = "2020-01-01"
//! end   = "2024-12-31"
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `RWIS_TIME_RANGE__END=2025-12-31`. Only the real process environment is
//! read; `.env` files are not loaded.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use rwis_olap_core::run::RunReport;
use rwis_olap_sqlite::EtlConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Migrate RWIS residents and issue reports into the OLAP warehouse")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = load_config(config::File::from(cli.config).required(false))?;

  let report = rwis_olap_sqlite::migrate(&config)
    .await
    .context("migration failed; the warehouse was left without this run's data")?;

  log_report(&report);
  Ok(())
}

/// Layer `file` under the `RWIS_` environment and deserialise the result.
fn load_config<S>(file: S) -> anyhow::Result<EtlConfig>
where
  S: config::Source + Send + Sync + 'static,
{
  let settings = config::Config::builder()
    .add_source(file)
    .add_source(
      config::Environment::with_prefix("RWIS")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise EtlConfig")
}

fn log_report(report: &RunReport) {
  tracing::info!(
    time_rows = report.time_rows,
    residents = report.residents,
    issue_reports = report.issue_reports,
    facts = report.facts,
    "Migration committed for {}",
    report.time_range
  );
  if report.unmatched > 0 {
    tracing::warn!(
      "{} issue report(s) have no fact row; widen time_range if they fall outside it",
      report.unmatched
    );
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use config::{File, FileFormat};
  use rwis_olap_core::range::DateRange;

  use super::*;

  #[test]
  fn time_range_defaults_when_omitted() {
    let cfg = load_config(File::from_str(
      r#"
        source_path    = "oltp.db"
        warehouse_path = "olap.db"
      "#,
      FileFormat::Toml,
    ))
    .unwrap();

    assert_eq!(cfg.source_path, PathBuf::from("oltp.db"));
    assert_eq!(cfg.warehouse_path, PathBuf::from("olap.db"));
    assert_eq!(cfg.time_range, DateRange::default());
  }

  #[test]
  fn time_range_is_read_from_table() {
    let cfg = load_config(File::from_str(
      r#"
        source_path    = "oltp.db"
        warehouse_path = "olap.db"

        [time_range]
        start = "2019-01-01"
        end   = "2025-12-31"
      "#,
      FileFormat::Toml,
    ))
    .unwrap();

    assert_eq!(cfg.time_range.start(), NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
    assert_eq!(cfg.time_range.end(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
  }

  #[test]
  fn reversed_time_range_is_rejected() {
    let res = load_config(File::from_str(
      r#"
        source_path    = "oltp.db"
        warehouse_path = "olap.db"

        [time_range]
        start = "2025-01-01"
        end   = "2020-01-01"
      "#,
      FileFormat::Toml,
    ));
    assert!(res.is_err());
  }

  #[test]
  fn missing_paths_are_rejected() {
    let res = load_config(File::from_str("", FileFormat::Toml));
    assert!(res.is_err());
  }
}
