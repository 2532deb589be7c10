//! Reports over artist-format stream events

use mih_common::Result;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{DateRange, Filters};

/// Overall totals for `GET /reports/summary`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Summary {
    pub total_artists: i64,
    /// Event rows (one per track/day/platform line)
    pub total_tracks: i64,
    pub total_streams: i64,
    /// Earliest and latest non-empty `stream_date`
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ArtistTotal {
    pub artist_name: String,
    pub total_streams: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct PlatformTotal {
    pub platform: Option<String>,
    pub total_streams: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CountryTotal {
    pub country: Option<String>,
    pub total_streams: i64,
}

pub async fn summary(pool: &SqlitePool, range: &DateRange) -> Result<Summary> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            COUNT(DISTINCT artist_name) AS total_artists,
            COUNT(*) AS total_tracks,
            COALESCE(SUM(streams), 0) AS total_streams,
            MIN(NULLIF(stream_date, '')) AS first_date,
            MAX(NULLIF(stream_date, '')) AS last_date
        FROM stream_events
        "#,
    );
    Filters::new()
        .range("stream_date", range)
        .push_to(&mut builder);

    let summary = builder.build_query_as::<Summary>().fetch_one(pool).await?;
    Ok(summary)
}

/// Artists by summed streams, highest first
pub async fn top_artists(pool: &SqlitePool, limit: i64, range: &DateRange) -> Result<Vec<ArtistTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT artist_name, SUM(streams) AS total_streams FROM stream_events",
    );
    Filters::new()
        .range("stream_date", range)
        .push_to(&mut builder);
    builder.push(" GROUP BY artist_name ORDER BY total_streams DESC, artist_name ASC LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<ArtistTotal>().fetch_all(pool).await?;
    Ok(rows)
}

/// Streams per consumption platform (`service` column)
pub async fn streams_by_platform(pool: &SqlitePool, range: &DateRange) -> Result<Vec<PlatformTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT service AS platform, SUM(streams) AS total_streams FROM stream_events",
    );
    Filters::new()
        .range("stream_date", range)
        .push_to(&mut builder);
    builder.push(" GROUP BY service ORDER BY total_streams DESC, service ASC");

    let rows = builder.build_query_as::<PlatformTotal>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn streams_by_country(pool: &SqlitePool, range: &DateRange) -> Result<Vec<CountryTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT country, SUM(streams) AS total_streams FROM stream_events",
    );
    Filters::new()
        .range("stream_date", range)
        .push_to(&mut builder);
    builder.push(" GROUP BY country ORDER BY total_streams DESC, country ASC");

    let rows = builder.build_query_as::<CountryTotal>().fetch_all(pool).await?;
    Ok(rows)
}
