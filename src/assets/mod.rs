use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{any, MethodRouter},
};
use tracing::error;

use crate::error::AppError;
use crate::AppState;

/// Front-end files served at fixed paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticAsset {
    Index,
    Stylesheet,
    Script,
    Disclaimer,
}

impl StaticAsset {
    pub fn file_name(&self) -> &'static str {
        match self {
            StaticAsset::Index => "index.html",
            StaticAsset::Stylesheet => "styles.css",
            StaticAsset::Script => "script.js",
            StaticAsset::Disclaimer => "Disclaimer.html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            StaticAsset::Index | StaticAsset::Disclaimer => "text/html",
            StaticAsset::Stylesheet => "text/css",
            StaticAsset::Script => "application/javascript",
        }
    }
}

pub fn routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", asset_route(StaticAsset::Index))
        .route("/styles.css", asset_route(StaticAsset::Stylesheet))
        .route("/script.js", asset_route(StaticAsset::Script))
        .route("/Disclaimer.html", asset_route(StaticAsset::Disclaimer))
        .route("/favicon.ico", any(favicon))
}

fn asset_route(asset: StaticAsset) -> MethodRouter<AppState> {
    any(move |state: State<AppState>| serve(state, asset))
}

async fn serve(State(state): State<AppState>, asset: StaticAsset) -> impl IntoResponse {
    let path = state.config.front_dir.join(asset.file_name());

    match tokio::fs::read(&path).await {
        Ok(content) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, asset.content_type())],
            content,
        )),
        Err(e) => {
            error!("Error serving file {}: {}", path.display(), e);
            Err(AppError::not_found())
        }
    }
}

/// Browsers request this unprompted
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
