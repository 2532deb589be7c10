//! Ingestion ledger
//!
//! Owns the link between an ingestion and its event rows. Every write here
//! is one transaction: either the ingestion and all of its rows exist, or
//! none of them do.

use chrono::{SecondsFormat, Utc};
use mih_common::db::{FixedSource, Ingestion};
use mih_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::ingest::{DevicePoint, StreamEventRecord};

/// Rows per multi-row INSERT; keeps bind counts well under SQLite's limit
const INSERT_CHUNK_ROWS: usize = 100;

/// Take the write lock when the transaction opens. A deferred transaction
/// that reads first fails with `SQLITE_BUSY_SNAPSHOT` if another writer
/// commits before its first write, and `busy_timeout` does not retry that.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Persist an artist upload: ingestion (total_rows = N) plus N events
pub async fn record_artist_ingestion(
    pool: &SqlitePool,
    file_name: &str,
    events: &[StreamEventRecord],
) -> Result<i64> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;

    let outcome = write_artist_rows(&mut *tx, file_name, events).await;
    match outcome {
        Ok(ingestion_id) => {
            tx.commit().await?;
            info!(ingestion_id, file = file_name, rows = events.len(), "Artist ingestion committed");
            Ok(ingestion_id)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            warn!(file = file_name, error = %e, "Artist ingestion rolled back");
            Err(e)
        }
    }
}

async fn write_artist_rows(
    conn: &mut SqliteConnection,
    file_name: &str,
    events: &[StreamEventRecord],
) -> Result<i64> {
    let ingestion_id = insert_ingestion(
        conn,
        FixedSource::Artist,
        file_name,
        events.len() as i64,
    )
    .await?;

    for chunk in events.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO stream_events \
             (ingestion_id, artist_name, track_title, isrc, upc, service, country, stream_date, streams) ",
        );
        builder.push_values(chunk, |mut row, event| {
            row.push_bind(ingestion_id)
                .push_bind(event.artist_name.clone())
                .push_bind(event.track_title.clone())
                .push_bind(event.isrc.clone())
                .push_bind(event.upc.clone())
                .push_bind(event.service.clone())
                .push_bind(event.country.clone())
                .push_bind(event.stream_date.clone())
                .push_bind(event.streams);
        });
        builder.build().execute(&mut *conn).await?;
    }

    Ok(ingestion_id)
}

/// Persist a device upload; total_rows is set to the point count at the end
pub async fn record_device_ingestion(
    pool: &SqlitePool,
    file_name: &str,
    distributor: &str,
    points: &[DevicePoint],
) -> Result<i64> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;

    let outcome = write_device_rows(&mut *tx, file_name, distributor, points).await;
    match outcome {
        Ok(ingestion_id) => {
            tx.commit().await?;
            info!(ingestion_id, file = file_name, distributor, rows = points.len(), "Device ingestion committed");
            Ok(ingestion_id)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            warn!(file = file_name, error = %e, "Device ingestion rolled back");
            Err(e)
        }
    }
}

async fn write_device_rows(
    conn: &mut SqliteConnection,
    file_name: &str,
    distributor: &str,
    points: &[DevicePoint],
) -> Result<i64> {
    let ingestion_id = insert_ingestion(conn, FixedSource::Device, file_name, 0).await?;

    for chunk in points.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO device_daily_streams \
             (ingestion_id, distributor, device_name, day_label, streams) ",
        );
        builder.push_values(chunk, |mut row, point| {
            row.push_bind(ingestion_id)
                .push_bind(distributor.to_string())
                .push_bind(point.device_name.clone())
                .push_bind(point.day_label.clone())
                .push_bind(point.streams);
        });
        builder.build().execute(&mut *conn).await?;
    }

    sqlx::query("UPDATE ingestions SET total_rows = ? WHERE id = ?")
        .bind(points.len() as i64)
        .bind(ingestion_id)
        .execute(&mut *conn)
        .await?;

    Ok(ingestion_id)
}

async fn insert_ingestion(
    conn: &mut SqliteConnection,
    source: FixedSource,
    file_name: &str,
    total_rows: i64,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO ingestions (source_id, file_name, ingested_at, total_rows) VALUES (?, ?, ?, ?)",
    )
    .bind(source.id())
    .bind(file_name)
    .bind(now_rfc3339())
    .bind(total_rows)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Delete an ingestion and its event rows
///
/// Event rows go first; the foreign keys would reject the reverse order.
pub async fn delete_ingestion(pool: &SqlitePool, ingestion_id: i64) -> Result<()> {
    let mut tx = pool.begin_with(BEGIN_WRITE).await?;

    let source_id: Option<i64> = sqlx::query_scalar("SELECT source_id FROM ingestions WHERE id = ?")
        .bind(ingestion_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(source_id) = source_id else {
        return Err(Error::NotFound(format!("Ingestion {} not found", ingestion_id)));
    };

    // Rows of an unknown source could sit in either table
    let tables = match FixedSource::from_id(source_id) {
        Some(source) => vec![source.event_table()],
        None => vec!["stream_events", "device_daily_streams"],
    };

    for table in tables {
        let deleted = sqlx::query(&format!("DELETE FROM {} WHERE ingestion_id = ?", table))
            .bind(ingestion_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!(ingestion_id, table, deleted, "Deleted event rows");
    }

    sqlx::query("DELETE FROM ingestions WHERE id = ?")
        .bind(ingestion_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(ingestion_id, "Ingestion deleted");

    Ok(())
}

/// All ingestions, newest first
pub async fn list_ingestions(pool: &SqlitePool) -> Result<Vec<Ingestion>> {
    let rows = sqlx::query_as::<_, Ingestion>(
        r#"
        SELECT id, source_id, file_name, ingested_at, total_rows
        FROM ingestions
        ORDER BY datetime(ingested_at) DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_ingestion(pool: &SqlitePool, ingestion_id: i64) -> Result<Ingestion> {
    sqlx::query_as::<_, Ingestion>(
        "SELECT id, source_id, file_name, ingested_at, total_rows FROM ingestions WHERE id = ?",
    )
    .bind(ingestion_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Ingestion {} not found", ingestion_id)))
}
