//! Core types for the RWIS OLTP → OLAP migration.
//!
//! This crate is deliberately free of database dependencies. It describes the
//! star schema's rows, the configured time window and the forward-only run
//! state machine; `rwis-olap-sqlite` moves data between real databases.

pub mod dimension;
pub mod error;
pub mod range;
pub mod run;

pub use error::{Error, Result};
