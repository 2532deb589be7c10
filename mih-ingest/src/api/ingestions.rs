//! Ingestion API handlers
//!
//! POST /ingestions/upload/artist, POST /ingestions/upload/device,
//! GET /ingestions/, GET|DELETE /ingestions/:id

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use mih_common::db::Ingestion;
use serde::Serialize;
use tracing::info;

use crate::db::ledger;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Uploads larger than this are rejected before reaching the pipeline
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// POST /ingestions/upload/artist response
#[derive(Debug, Serialize)]
pub struct ArtistUploadResponse {
    pub status: &'static str,
    pub ingestion_id: i64,
    pub rows_inserted: usize,
    pub encoding_detected: &'static str,
}

/// POST /ingestions/upload/device response
#[derive(Debug, Serialize)]
pub struct DeviceUploadResponse {
    pub message: &'static str,
    pub ingestion_id: i64,
    pub file_name: String,
    pub distributor: String,
    pub total_points: usize,
    pub encoding_detected: &'static str,
}

/// DELETE /ingestions/:id response
#[derive(Debug, Serialize)]
pub struct DeleteIngestionResponse {
    pub status: &'static str,
    pub deleted_ingestion_id: i64,
}

/// Multipart form fields of an upload
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    distributor: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let key = field.name().unwrap_or("").to_string();
            match key.as_str() {
                "file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                    form.bytes = Some(bytes.to_vec());
                }
                "distributor" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read distributor: {}", e)))?;
                    form.distributor = Some(text);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn file(&mut self) -> ApiResult<(String, Vec<u8>)> {
        let bytes = self
            .bytes
            .take()
            .ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
        let name = self.file_name.take().unwrap_or_default();
        Ok((name, bytes))
    }
}

/// POST /ingestions/upload/artist
pub async fn upload_artist(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ArtistUploadResponse>> {
    let mut form = UploadForm::read(multipart).await?;
    let (file_name, bytes) = form.file()?;

    let outcome = state.pipeline.ingest_artist(&file_name, &bytes).await?;

    Ok(Json(ArtistUploadResponse {
        status: "ok",
        ingestion_id: outcome.ingestion_id,
        rows_inserted: outcome.rows_inserted,
        encoding_detected: outcome.encoding.label(),
    }))
}

/// POST /ingestions/upload/device
pub async fn upload_device(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<DeviceUploadResponse>> {
    let mut form = UploadForm::read(multipart).await?;
    let (file_name, bytes) = form.file()?;
    let distributor = form
        .distributor
        .take()
        .ok_or_else(|| ApiError::BadRequest("Missing 'distributor' field".to_string()))?;

    let outcome = state
        .pipeline
        .ingest_device(&file_name, &distributor, &bytes)
        .await?;

    Ok(Json(DeviceUploadResponse {
        message: "Device upload processed successfully.",
        ingestion_id: outcome.ingestion_id,
        file_name: outcome.file_name,
        distributor: outcome.distributor,
        total_points: outcome.total_points,
        encoding_detected: outcome.encoding.label(),
    }))
}

/// GET /ingestions/
pub async fn list_ingestions(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingestion>>> {
    Ok(Json(ledger::list_ingestions(&state.db).await?))
}

/// GET /ingestions/:id
pub async fn get_ingestion(
    State(state): State<AppState>,
    Path(ingestion_id): Path<i64>,
) -> ApiResult<Json<Ingestion>> {
    Ok(Json(ledger::get_ingestion(&state.db, ingestion_id).await?))
}

/// DELETE /ingestions/:id
pub async fn delete_ingestion(
    State(state): State<AppState>,
    Path(ingestion_id): Path<i64>,
) -> ApiResult<Json<DeleteIngestionResponse>> {
    ledger::delete_ingestion(&state.db, ingestion_id).await?;
    info!(ingestion_id, "Deleted via API");

    Ok(Json(DeleteIngestionResponse {
        status: "ok",
        deleted_ingestion_id: ingestion_id,
    }))
}

/// Build ingestion routes
pub fn ingestion_routes() -> Router<AppState> {
    Router::new()
        .route("/ingestions/upload/artist", post(upload_artist))
        .route("/ingestions/upload/device", post(upload_device))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route("/ingestions", get(list_ingestions))
        .route("/ingestions/", get(list_ingestions))
        .route("/ingestions/:id", get(get_ingestion).delete(delete_ingestion))
}
