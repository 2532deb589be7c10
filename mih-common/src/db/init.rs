//! Database initialization
//!
//! Opens (or creates) the SQLite file, creates every table and index if
//! missing, and seeds the two fixed sources on first run. Idempotent: safe to
//! call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection pragma, so they go on the connect
    // options rather than a one-off query against the pool.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes, then seed sources
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_sources_table(pool).await?;
    create_ingestions_table(pool).await?;
    create_stream_events_table(pool).await?;
    create_device_daily_streams_table(pool).await?;
    create_api_connectors_table(pool).await?;
    create_indexes(pool).await?;
    seed_sources(pool).await?;
    Ok(())
}

async fn create_sources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('csv', 'api')),
            description TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ingestions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingestions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id INTEGER NOT NULL,
            file_name TEXT NOT NULL,
            ingested_at TEXT NOT NULL,
            total_rows INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_stream_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stream_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingestion_id INTEGER NOT NULL,
            artist_name TEXT NOT NULL,
            track_title TEXT,
            isrc TEXT,
            upc TEXT,
            service TEXT,
            country TEXT,
            stream_date TEXT,
            streams INTEGER NOT NULL,
            FOREIGN KEY (ingestion_id) REFERENCES ingestions(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_device_daily_streams_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS device_daily_streams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingestion_id INTEGER NOT NULL,
            distributor TEXT NOT NULL,
            device_name TEXT NOT NULL,
            day_label TEXT NOT NULL,
            streams INTEGER NOT NULL,
            FOREIGN KEY (ingestion_id) REFERENCES ingestions(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_api_connectors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS api_connectors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            base_url TEXT,
            auth_type TEXT NOT NULL DEFAULT 'api_key',
            api_key TEXT,
            api_secret TEXT,
            client_id TEXT,
            client_secret TEXT,
            token_url TEXT,
            additional_headers TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_sync_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            notes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_stream_events_artist ON stream_events (artist_name)",
    "CREATE INDEX IF NOT EXISTS idx_stream_events_date ON stream_events (stream_date)",
    "CREATE INDEX IF NOT EXISTS idx_stream_events_service ON stream_events (service)",
    "CREATE INDEX IF NOT EXISTS idx_stream_events_country ON stream_events (country)",
    "CREATE INDEX IF NOT EXISTS idx_stream_events_ingestion ON stream_events (ingestion_id)",
    "CREATE INDEX IF NOT EXISTS idx_stream_events_artist_date ON stream_events (artist_name, stream_date)",
    "CREATE INDEX IF NOT EXISTS idx_device_streams_device ON device_daily_streams (device_name)",
    "CREATE INDEX IF NOT EXISTS idx_device_streams_day ON device_daily_streams (day_label)",
    "CREATE INDEX IF NOT EXISTS idx_device_streams_distributor ON device_daily_streams (distributor)",
    "CREATE INDEX IF NOT EXISTS idx_device_streams_ingestion ON device_daily_streams (ingestion_id)",
    "CREATE INDEX IF NOT EXISTS idx_device_streams_device_day ON device_daily_streams (device_name, day_label)",
    "CREATE INDEX IF NOT EXISTS idx_ingestions_date ON ingestions (ingested_at)",
    "CREATE INDEX IF NOT EXISTS idx_api_connectors_name ON api_connectors (name)",
    "CREATE INDEX IF NOT EXISTS idx_api_connectors_active ON api_connectors (is_active)",
];

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Seed the two fixed sources when the table is empty
///
/// Ids are explicit so `ARTIST_SOURCE_ID`/`DEVICE_SOURCE_ID` always match.
async fn seed_sources(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO sources (id, name, type, description, is_active) VALUES
            (?, 'Uploads CSV (artistas)', 'csv',
             'Uploads manuais de arquivos CSV de streams por artista', 1),
            (?, 'Uploads CSV (dispositivos)', 'csv',
             'Uploads manuais de arquivos CSV de streams por dispositivo', 1)
        "#,
    )
    .bind(super::ARTIST_SOURCE_ID)
    .bind(super::DEVICE_SOURCE_ID)
    .execute(pool)
    .await?;

    info!("Seeded fixed sources (artist CSV, device CSV)");
    Ok(())
}
