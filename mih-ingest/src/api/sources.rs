//! Source API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use mih_common::db::Source;

use crate::db::sources;
use crate::error::ApiResult;
use crate::AppState;

/// GET /sources/
pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<Vec<Source>>> {
    Ok(Json(sources::list_sources(&state.db).await?))
}

/// GET /sources/:id
pub async fn get_source(
    State(state): State<AppState>,
    Path(source_id): Path<i64>,
) -> ApiResult<Json<Source>> {
    Ok(Json(sources::get_source(&state.db, source_id).await?))
}

/// POST /sources/:id/toggle
///
/// Returns the source with its new `is_active`.
pub async fn toggle_source(
    State(state): State<AppState>,
    Path(source_id): Path<i64>,
) -> ApiResult<Json<Source>> {
    let source = sources::toggle_source(&state.db, source_id).await?;
    tracing::info!(source_id, is_active = source.is_active, "Source toggled");
    Ok(Json(source))
}

pub fn source_routes() -> Router<AppState> {
    Router::new()
        .route("/sources", get(list_sources))
        .route("/sources/", get(list_sources))
        .route("/sources/:id", get(get_source))
        .route("/sources/:id/toggle", post(toggle_source))
}
