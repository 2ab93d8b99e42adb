use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::storage::StorageError;

pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Request-level failures, converted to a response at the handler boundary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("Storage directory unavailable: {0}")]
    DirectoryUnavailable(#[source] std::io::Error),
    #[error("Download failed before streaming: {0}")]
    PreStreamFailure(#[source] std::io::Error),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::NotFound(NOT_FOUND_BODY.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DirectoryUnavailable { source, .. } => {
                AppError::DirectoryUnavailable(source)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain")],
                message,
            )
                .into_response(),
            AppError::DirectoryUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Could not read files directory"
                })),
            )
                .into_response(),
            AppError::PreStreamFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Error downloading file",
            )
                .into_response(),
        }
    }
}

/// Fallback for every unmatched route
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    tracing::debug!("No route for {}", uri.path());
    AppError::not_found()
}
