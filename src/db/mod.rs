//! Database module: record tables and catalog lookups.
//!
//! Layout:
//! - `models.rs`: `Record` rows and the validated `NewRecord` input
//! - `schema.rs`: DDL for record tables (SQLite)
//! - `catalog.rs`: `TableRegistry` and the validated `TableName`
//! - `sqlite.rs`: pool setup and `RecordStore`

pub mod catalog;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use catalog::{TableName, TableRegistry};
pub use models::{NewRecord, Record};
pub use sqlite::{RecordStore, SqlitePool};
