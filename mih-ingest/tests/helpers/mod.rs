//! Test Helper Utilities
//!
//! Shared utilities for testing mih-ingest

#![allow(dead_code, unused_imports)]

pub mod db_utils;
pub mod multipart;

pub use db_utils::{count_rows, create_test_env, TestEnv};
pub use multipart::MultipartBody;
