use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json,
};
use futures_util::TryStreamExt;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::storage;
use crate::AppState;

pub fn routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/api/files", any(list_artifacts))
        .route("/download/*name", any(download_artifact))
}

/// GET /api/files
/// List artifacts with their descriptions and download counts
async fn list_artifacts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let artifacts = storage::list_artifacts(&state.config, &state.counter).await?;
    Ok(Json(artifacts))
}

/// GET /download/*name
/// Stream one artifact as an attachment and count the attempt
async fn download_artifact(
    State(state): State<AppState>,
    raw_name: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    // Names that do not decode to UTF-8 cannot exist in the listing
    let Path(raw_name) = raw_name.map_err(|e| {
        warn!("Rejected download path: {}", e);
        AppError::not_found()
    })?;

    let Some(name) = sanitize_name(&raw_name) else {
        warn!("Rejected download name {:?}", raw_name);
        return Err(AppError::not_found());
    };

    let path = state.config.files_dir.join(name);
    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => {
            error!("File not found: {}", path.display());
            return Err(AppError::NotFound("File not found.".to_string()));
        }
    };

    // Counts attempts, not completed transfers
    let total = state.counter.increment(name);
    info!("Downloading {}, total downloads: {}", name, total);

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        error!("Error opening file {}: {}", path.display(), e);
        AppError::PreStreamFailure(e)
    })?;

    let disposition = HeaderValue::from_bytes(format!("attachment; filename={}", name).as_bytes())
        .map_err(|e| {
            error!("Cannot build Content-Disposition for {:?}: {}", name, e);
            AppError::PreStreamFailure(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

    // Headers are committed once the body starts, so a read error can only
    // end the stream.
    let stream_path = path.clone();
    let stream = ReaderStream::new(file).inspect_err(move |e| {
        error!("Error streaming file {}: {}", stream_path.display(), e);
    });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(meta.len())),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Reduce a requested name to its final path segment.
///
/// Returns `None` when nothing usable is left, so the caller can only ever
/// join a plain file name onto the storage directory.
pub fn sanitize_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
