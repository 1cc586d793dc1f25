//! Run configuration, deserialised by the binary from `config.toml` and the
//! environment.

use std::path::PathBuf;

use rwis_olap_core::range::DateRange;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
  /// Operational database; opened read-only.
  pub source_path:    PathBuf,
  /// Warehouse database; created if missing.
  pub warehouse_path: PathBuf,
  /// Days generated into `dim_time`. Defaults to 2020-01-01..=2024-12-31.
  #[serde(default)]
  pub time_range:     DateRange,
}
