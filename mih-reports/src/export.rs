//! CSV exports of raw event rows

use mih_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::reports::{DateRange, Filters};

pub const STREAM_EVENT_HEADERS: [&str; 9] = [
    "ingestion_id",
    "artist_name",
    "track_title",
    "isrc",
    "upc",
    "service",
    "country",
    "stream_date",
    "streams",
];

pub const DEVICE_STREAM_HEADERS: [&str; 5] = [
    "ingestion_id",
    "distributor",
    "device_name",
    "day_label",
    "streams",
];

type StreamEventRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

type DeviceStreamRow = (i64, String, String, String, i64);

/// Serialize rows to CSV text with a header line
pub fn export_to_csv<T, F>(
    items: impl IntoIterator<Item = T>,
    headers: &[&str],
    row_fn: F,
) -> std::result::Result<String, csv::Error>
where
    F: Fn(T) -> Vec<String>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers)?;

    for item in items {
        wtr.write_record(&row_fn(item))?;
    }

    let data = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Stream events in insertion order, optionally for one artist
pub async fn export_stream_events_csv(
    pool: &SqlitePool,
    range: &DateRange,
    artist: Option<&str>,
) -> Result<String> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT ingestion_id, artist_name, track_title, isrc, upc, service, country, \
         stream_date, streams FROM stream_events",
    );
    Filters::new()
        .range("stream_date", range)
        .equals("artist_name", artist)
        .push_to(&mut builder);
    builder.push(" ORDER BY id ASC");

    let rows: Vec<StreamEventRow> = builder.build_query_as().fetch_all(pool).await?;

    export_to_csv(rows, &STREAM_EVENT_HEADERS, |row| {
        vec![
            row.0.to_string(),
            row.1,
            row.2.unwrap_or_default(),
            row.3.unwrap_or_default(),
            row.4.unwrap_or_default(),
            row.5.unwrap_or_default(),
            row.6.unwrap_or_default(),
            row.7.unwrap_or_default(),
            row.8.to_string(),
        ]
    })
    .map_err(|e| mih_common::Error::Internal(format!("CSV export failed: {}", e)))
}

/// Device daily streams in insertion order, optionally for one distributor
pub async fn export_device_streams_csv(
    pool: &SqlitePool,
    range: &DateRange,
    distributor: Option<&str>,
) -> Result<String> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT ingestion_id, distributor, device_name, day_label, streams FROM device_daily_streams",
    );
    Filters::new()
        .range("day_label", range)
        .equals("distributor", distributor)
        .push_to(&mut builder);
    builder.push(" ORDER BY id ASC");

    let rows: Vec<DeviceStreamRow> = builder.build_query_as().fetch_all(pool).await?;

    export_to_csv(rows, &DEVICE_STREAM_HEADERS, |row| {
        vec![
            row.0.to_string(),
            row.1,
            row.2,
            row.3,
            row.4.to_string(),
        ]
    })
    .map_err(|e| mih_common::Error::Internal(format!("CSV export failed: {}", e)))
}
