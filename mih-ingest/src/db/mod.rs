//! Database access for mih-ingest
//!
//! All functions take the shared pool and return `mih_common::Result`.

pub mod connectors;
pub mod ledger;
pub mod sources;

pub use mih_common::db::init_database;
