//! SQLite backend for the RWIS OLTP → OLAP migration.
//!
//! Wraps [`tokio_rusqlite`] so each database connection runs on its own
//! thread. [`SourceDb`] reads the operational tables, [`Warehouse`] owns the
//! star schema, and [`Pipeline`] moves data from one to the other in a single
//! transaction.

mod encode;
mod schema;

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod warehouse;

pub use config::EtlConfig;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, migrate};
pub use source::SourceDb;
pub use warehouse::{TableCounts, Warehouse};
