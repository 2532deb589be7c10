//! CSV export endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::ReportResult;
use crate::export;
use crate::reports::DateRange;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StreamExportQuery {
    pub artist: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceExportQuery {
    pub distributor: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn csv_response(file_name: &'static str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
}

/// GET /reports/export/stream-events.csv
pub async fn export_stream_events(
    State(state): State<AppState>,
    Query(query): Query<StreamExportQuery>,
) -> ReportResult<impl IntoResponse> {
    let body =
        export::export_stream_events_csv(&state.db, &query.range(), query.artist.as_deref()).await?;
    Ok(csv_response("stream_events.csv", body))
}

/// GET /reports/export/device-streams.csv
pub async fn export_device_streams(
    State(state): State<AppState>,
    Query(query): Query<DeviceExportQuery>,
) -> ReportResult<impl IntoResponse> {
    let body = export::export_device_streams_csv(
        &state.db,
        &query.range(),
        query.distributor.as_deref(),
    )
    .await?;
    Ok(csv_response("device_streams.csv", body))
}

impl StreamExportQuery {
    fn range(&self) -> DateRange {
        DateRange::new(self.from.as_deref(), self.to.as_deref())
    }
}

impl DeviceExportQuery {
    fn range(&self) -> DateRange {
        DateRange::new(self.from.as_deref(), self.to.as_deref())
    }
}

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/export/stream-events.csv", get(export_stream_events))
        .route("/reports/export/device-streams.csv", get(export_device_streams))
}
