//! # Music Insights Hub Common Library
//!
//! Shared code for the ingest and reports services:
//! - Error type
//! - Bootstrap configuration and root folder resolution
//! - Database initialization (schema, indexes, seeded sources)
//! - Row models for the relational store

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
