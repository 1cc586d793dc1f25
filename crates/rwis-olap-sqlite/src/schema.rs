//! SQL schema for the OLAP warehouse.
//!
//! Executed once per run before the data transaction opens. Every statement
//! is `CREATE TABLE IF NOT EXISTS`, so an existing warehouse is left as is;
//! [`EXPECTED_COLUMNS`] is then used to reject tables of the wrong shape.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dim_time (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    date  TEXT    NOT NULL UNIQUE,   -- YYYY-MM-DD
    day   INTEGER NOT NULL,
    month INTEGER NOT NULL,
    year  INTEGER NOT NULL
);

-- id is the source resident id, carried verbatim.
CREATE TABLE IF NOT EXISTS dim_resident (
    id   INTEGER PRIMARY KEY,
    name TEXT    NOT NULL
);

-- resident_id is the source resident id, deliberately not a foreign key.
CREATE TABLE IF NOT EXISTS dim_issue_report (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    resident_id     INTEGER NOT NULL,
    title           TEXT    NOT NULL,
    description     TEXT    NOT NULL,
    created_at      TEXT    NOT NULL,   -- YYYY-MM-DD HH:MM:SS[.f]
    updated_at      TEXT    NOT NULL,
    status          TEXT    NOT NULL,
    approval_status TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS fact_issue_report (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    dim_time_id         INTEGER NOT NULL REFERENCES dim_time(id),
    dim_resident_id     INTEGER NOT NULL REFERENCES dim_resident(id),
    dim_issue_report_id INTEGER NOT NULL REFERENCES dim_issue_report(id)
);
";

/// Tables in dependency order, each with the columns a run reads or writes.
pub const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
  ("dim_time", &["id", "date", "day", "month", "year"]),
  ("dim_resident", &["id", "name"]),
  ("dim_issue_report", &[
    "id",
    "resident_id",
    "title",
    "description",
    "created_at",
    "updated_at",
    "status",
    "approval_status",
  ]),
  ("fact_issue_report", &[
    "id",
    "dim_time_id",
    "dim_resident_id",
    "dim_issue_report_id",
  ]),
];

/// Connection-level settings. Must run outside any transaction.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";
