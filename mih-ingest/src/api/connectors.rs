//! Connector configuration API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use mih_common::db::Connector;
use serde::Serialize;

use crate::db::connectors::{self, AuthTypeOption, ConnectorPatch, NewConnector};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectorCreatedResponse {
    pub status: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDeletedResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectorToggledResponse {
    pub status: &'static str,
    pub is_active: bool,
}

/// GET /connectors/
pub async fn list_connectors(State(state): State<AppState>) -> ApiResult<Json<Vec<Connector>>> {
    Ok(Json(connectors::list_connectors(&state.db).await?))
}

/// GET /connectors/:id
pub async fn get_connector(
    State(state): State<AppState>,
    Path(connector_id): Path<i64>,
) -> ApiResult<Json<Connector>> {
    Ok(Json(connectors::get_connector(&state.db, connector_id).await?))
}

/// POST /connectors/
pub async fn create_connector(
    State(state): State<AppState>,
    Json(request): Json<NewConnector>,
) -> ApiResult<Json<ConnectorCreatedResponse>> {
    let id = connectors::create_connector(&state.db, &request).await?;
    Ok(Json(ConnectorCreatedResponse { status: "ok", id }))
}

/// PUT /connectors/:id
///
/// 400 when the body sets no field at all.
pub async fn update_connector(
    State(state): State<AppState>,
    Path(connector_id): Path<i64>,
    Json(patch): Json<ConnectorPatch>,
) -> ApiResult<Json<Connector>> {
    Ok(Json(
        connectors::update_connector(&state.db, connector_id, &patch).await?,
    ))
}

/// DELETE /connectors/:id
pub async fn delete_connector(
    State(state): State<AppState>,
    Path(connector_id): Path<i64>,
) -> ApiResult<Json<ConnectorDeletedResponse>> {
    let name = connectors::delete_connector(&state.db, connector_id).await?;
    Ok(Json(ConnectorDeletedResponse {
        status: "ok",
        message: format!("Connector '{}' removed", name),
    }))
}

/// POST /connectors/:id/toggle
pub async fn toggle_connector(
    State(state): State<AppState>,
    Path(connector_id): Path<i64>,
) -> ApiResult<Json<ConnectorToggledResponse>> {
    let is_active = connectors::toggle_connector(&state.db, connector_id).await?;
    Ok(Json(ConnectorToggledResponse {
        status: "ok",
        is_active,
    }))
}

/// GET /connectors/auth-types/options
pub async fn auth_type_options() -> Json<Vec<AuthTypeOption>> {
    Json(connectors::auth_type_options())
}

pub fn connector_routes() -> Router<AppState> {
    Router::new()
        .route("/connectors", get(list_connectors).post(create_connector))
        .route("/connectors/", get(list_connectors).post(create_connector))
        .route("/connectors/auth-types/options", get(auth_type_options))
        .route(
            "/connectors/:id",
            get(get_connector).put(update_connector).delete(delete_connector),
        )
        .route("/connectors/:id/toggle", post(toggle_connector))
}
