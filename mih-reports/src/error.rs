//! Error types for mih-reports

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Query failed (500)
    #[error("Database error: {0}")]
    Database(String),
}

impl From<mih_common::Error> for ReportError {
    fn from(err: mih_common::Error) -> Self {
        ReportError::Database(err.to_string())
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ReportError::Database(msg) => {
                tracing::error!(error = %msg, "Report query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
