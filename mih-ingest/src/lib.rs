//! mih-ingest library interface
//!
//! CSV ingestion pipeline plus the HTTP surface for uploads, the ingestion
//! ledger, sources and connector configuration.

pub mod api;
pub mod db;
pub mod error;
pub mod ingest;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::ingest::IngestionPipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Upload → parse → persist entry point
    pub pipeline: IngestionPipeline,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, pipeline: IngestionPipeline) -> Self {
        Self {
            db,
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ingestion_routes())
        .merge(api::source_routes())
        .merge(api::connector_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
