//! Database access layer for mih-reports
//!
//! Every connection is opened read-only; the ingest service is the only
//! writer.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Connect to the shared database in read-only mode
///
/// Fails when the file does not exist yet; start mih-ingest once to create it.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nPlease run mih-ingest first to initialize the database.",
            db_path.display()
        );
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("Failed to connect to database in read-only mode")?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_database_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = connect_readonly(&tmp.path().join("absent.db")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_readonly_connection_rejects_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("music_insights.db");
        let writer = mih_common::db::init_database(&db_path).await.unwrap();
        writer.close().await;

        let pool = connect_readonly(&db_path).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);

        let result = sqlx::query("DELETE FROM sources").execute(&pool).await;
        assert!(result.is_err(), "Write operation should fail in read-only mode");
    }
}
