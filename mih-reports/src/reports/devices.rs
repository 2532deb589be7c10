//! Reports over device-format daily streams

use mih_common::Result;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{DateRange, Filters};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DistributorTotal {
    pub distributor: String,
    pub total_streams: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DeviceTotal {
    pub device_name: String,
    pub total_streams: i64,
}

/// One point of a per-day series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DayTotal {
    pub day_label: String,
    pub total_streams: i64,
}

pub async fn streams_by_distributor(
    pool: &SqlitePool,
    range: &DateRange,
) -> Result<Vec<DistributorTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT distributor, SUM(streams) AS total_streams FROM device_daily_streams",
    );
    Filters::new()
        .range("day_label", range)
        .push_to(&mut builder);
    builder.push(" GROUP BY distributor ORDER BY total_streams DESC, distributor ASC");

    let rows = builder.build_query_as::<DistributorTotal>().fetch_all(pool).await?;
    Ok(rows)
}

/// Devices by summed streams, optionally for one distributor
pub async fn top_devices(
    pool: &SqlitePool,
    limit: i64,
    range: &DateRange,
    distributor: Option<&str>,
) -> Result<Vec<DeviceTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT device_name, SUM(streams) AS total_streams FROM device_daily_streams",
    );
    Filters::new()
        .range("day_label", range)
        .equals("distributor", distributor)
        .push_to(&mut builder);
    builder.push(" GROUP BY device_name ORDER BY total_streams DESC, device_name ASC LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<DeviceTotal>().fetch_all(pool).await?;
    Ok(rows)
}

/// Per-day totals ordered by day label
///
/// Without a device filter every device is summed into the day.
pub async fn device_daily_series(
    pool: &SqlitePool,
    device: Option<&str>,
    distributor: Option<&str>,
    range: &DateRange,
) -> Result<Vec<DayTotal>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT day_label, SUM(streams) AS total_streams FROM device_daily_streams",
    );
    Filters::new()
        .range("day_label", range)
        .equals("device_name", device)
        .equals("distributor", distributor)
        .push_to(&mut builder);
    builder.push(" GROUP BY day_label ORDER BY day_label ASC");

    let rows = builder.build_query_as::<DayTotal>().fetch_all(pool).await?;
    Ok(rows)
}
