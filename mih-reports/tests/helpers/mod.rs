//! Shared fixtures for mih-reports integration tests
//!
//! The writer pool stands in for mih-ingest; reports always go through a
//! separate read-only pool on the same file.

#![allow(dead_code)]

use anyhow::Result;
use mih_common::db::{init_database, ARTIST_SOURCE_ID, DEVICE_SOURCE_ID};
use mih_reports::AppState;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct ReportEnv {
    pub _temp_dir: TempDir,
    pub writer: SqlitePool,
    pub pool: SqlitePool,
}

impl ReportEnv {
    pub fn router(&self) -> axum::Router {
        mih_reports::build_router(AppState::new(self.pool.clone()))
    }
}

/// Artist events as (artist, track, service, country, stream_date, streams)
pub const STREAM_EVENTS: [(&str, &str, &str, Option<&str>, &str, i64); 4] = [
    ("Ana", "Song A", "Spotify", Some("BR"), "2024-01-01", 100),
    ("Ana", "Song B", "Deezer", Some("BR"), "2024-01-02", 50),
    ("Bruno", "Song C", "Spotify", Some("US"), "2024-01-02", 120),
    ("Carla", "Song, D", "Spotify", None, "", 10),
];

/// Device points as (distributor, device, day_label, streams)
pub const DEVICE_STREAMS: [(&str, &str, &str, i64); 4] = [
    ("Distro A", "PlayerX", "2024-03-01", 10),
    ("Distro A", "PlayerX", "2024-03-02", 20),
    ("Distro A", "PlayerY", "2024-03-01", 5),
    ("Distro B", "PlayerX", "2024-03-01", 7),
];

/// Empty database plus a read-only pool over it
pub async fn create_empty_env() -> Result<ReportEnv> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("music_insights.db");
    let writer = init_database(&db_path).await?;
    let pool = mih_reports::db::connect_readonly(&db_path).await?;

    Ok(ReportEnv {
        _temp_dir: temp_dir,
        writer,
        pool,
    })
}

/// Database seeded with `STREAM_EVENTS` and `DEVICE_STREAMS`
pub async fn create_seeded_env() -> Result<ReportEnv> {
    let env = create_empty_env().await?;
    seed(&env.writer).await?;
    Ok(env)
}

async fn insert_ingestion(pool: &SqlitePool, source_id: i64, file_name: &str, rows: i64) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO ingestions (source_id, file_name, ingested_at, total_rows) VALUES (?, ?, ?, ?)",
    )
    .bind(source_id)
    .bind(file_name)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(rows)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

async fn seed(pool: &SqlitePool) -> Result<()> {
    let artist_id =
        insert_ingestion(pool, ARTIST_SOURCE_ID, "artists.csv", STREAM_EVENTS.len() as i64).await?;
    for (artist, track, service, country, date, streams) in STREAM_EVENTS {
        sqlx::query(
            "INSERT INTO stream_events \
             (ingestion_id, artist_name, track_title, isrc, upc, service, country, stream_date, streams) \
             VALUES (?, ?, ?, '', '', ?, ?, ?, ?)",
        )
        .bind(artist_id)
        .bind(artist)
        .bind(track)
        .bind(service)
        .bind(country)
        .bind(date)
        .bind(streams)
        .execute(pool)
        .await?;
    }

    let device_id =
        insert_ingestion(pool, DEVICE_SOURCE_ID, "devices.csv", DEVICE_STREAMS.len() as i64).await?;
    for (distributor, device, day, streams) in DEVICE_STREAMS {
        sqlx::query(
            "INSERT INTO device_daily_streams (ingestion_id, distributor, device_name, day_label, streams) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(device_id)
        .bind(distributor)
        .bind(device)
        .bind(day)
        .bind(streams)
        .execute(pool)
        .await?;
    }

    Ok(())
}
