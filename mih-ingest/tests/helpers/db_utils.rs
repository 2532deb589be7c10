//! Database Test Utilities

use anyhow::Result;
use mih_ingest::ingest::{IngestionPipeline, UploadStore};
use mih_ingest::AppState;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary root folder with an initialized database and uploads dir
///
/// `_temp_dir` must be kept alive for the duration of the test.
pub struct TestEnv {
    pub _temp_dir: TempDir,
    pub pool: SqlitePool,
    pub uploads_dir: PathBuf,
    pub pipeline: IngestionPipeline,
}

impl TestEnv {
    pub fn router(&self) -> axum::Router {
        mih_ingest::build_router(AppState::new(self.pool.clone(), self.pipeline.clone()))
    }

    /// Names of the files currently in the uploads directory
    pub fn saved_uploads(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .expect("uploads dir readable")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// File-backed database: every pooled connection sees the same data
pub async fn create_test_env() -> Result<TestEnv> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_music_insights.db");
    let pool = mih_common::db::init_database(&db_path).await?;

    let uploads_dir = temp_dir.path().join("uploads");
    let uploads = UploadStore::new(&uploads_dir)?;
    let pipeline = IngestionPipeline::new(pool.clone(), uploads);

    Ok(TestEnv {
        _temp_dir: temp_dir,
        pool,
        uploads_dir,
        pipeline,
    })
}

/// Row count of `table`, optionally restricted to one ingestion
pub async fn count_rows(pool: &SqlitePool, table: &str, ingestion_id: Option<i64>) -> i64 {
    match ingestion_id {
        Some(id) => sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE ingestion_id = ?",
            table
        ))
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap(),
        None => sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap(),
    }
}
