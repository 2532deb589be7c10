//! Aggregate report endpoints
//!
//! Every endpoint takes optional `from`/`to` bounds (inclusive, compared as
//! text against `stream_date` or `day_label`).

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::ReportResult;
use crate::reports::{
    self, clamp_limit, ArtistTotal, CountryTotal, DateRange, DayTotal, DeviceTotal,
    DistributorTotal, PlatformTotal, Summary,
};
use crate::AppState;

macro_rules! impl_range {
    ($($query:ty),+) => {
        $(impl $query {
            fn range(&self) -> DateRange {
                DateRange::new(self.from.as_deref(), self.to.as_deref())
            }
        })+
    };
}

impl_range!(LimitQuery, DeviceQuery, SeriesQuery);

/// `?limit&from&to`
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `?limit&distributor&from&to`
#[derive(Debug, Default, Deserialize)]
pub struct DeviceQuery {
    pub limit: Option<i64>,
    pub distributor: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `?device&distributor&from&to`
#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub device: Option<String>,
    pub distributor: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /reports/summary
pub async fn summary(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ReportResult<Json<Summary>> {
    Ok(Json(reports::summary(&state.db, &range).await?))
}

/// GET /reports/top-artists
pub async fn top_artists(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ReportResult<Json<Vec<ArtistTotal>>> {
    let limit = clamp_limit(query.limit);
    Ok(Json(reports::top_artists(&state.db, limit, &query.range()).await?))
}

/// GET /reports/streams-by-platform
pub async fn streams_by_platform(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ReportResult<Json<Vec<PlatformTotal>>> {
    Ok(Json(reports::streams_by_platform(&state.db, &range).await?))
}

/// GET /reports/streams-by-country
pub async fn streams_by_country(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ReportResult<Json<Vec<CountryTotal>>> {
    Ok(Json(reports::streams_by_country(&state.db, &range).await?))
}

/// GET /reports/streams-by-distributor
pub async fn streams_by_distributor(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ReportResult<Json<Vec<DistributorTotal>>> {
    Ok(Json(reports::streams_by_distributor(&state.db, &range).await?))
}

/// GET /reports/top-devices
pub async fn top_devices(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> ReportResult<Json<Vec<DeviceTotal>>> {
    let limit = clamp_limit(query.limit);
    let rows = reports::top_devices(
        &state.db,
        limit,
        &query.range(),
        query.distributor.as_deref(),
    )
    .await?;
    Ok(Json(rows))
}

/// GET /reports/device-series
pub async fn device_series(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> ReportResult<Json<Vec<DayTotal>>> {
    let rows = reports::device_daily_series(
        &state.db,
        query.device.as_deref(),
        query.distributor.as_deref(),
        &query.range(),
    )
    .await?;
    Ok(Json(rows))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/summary", get(summary))
        .route("/reports/top-artists", get(top_artists))
        .route("/reports/streams-by-platform", get(streams_by_platform))
        .route("/reports/streams-by-country", get(streams_by_country))
        .route("/reports/streams-by-distributor", get(streams_by_distributor))
        .route("/reports/top-devices", get(top_devices))
        .route("/reports/device-series", get(device_series))
}
