//! Static assets, animation definitions and stored image bytes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::AppState;
use crate::assets::{content_type_for, resolve_asset};
use crate::constants::STORED_CONTENT_TYPE;
use crate::models::BlobRef;
use crate::services::error::LogErr;
use crate::store::StoreError;

const BUNDLED_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets/{*path}", get(serve_asset))
        .route("/animations/{file}", get(serve_animation))
        .route("/blobs/{id}", get(serve_blob))
}

/// GET /assets/*path - bundled images from the assets directory
async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let full_path = resolve_asset(&state.assets_dir, &path).ok_or(StatusCode::NOT_FOUND)?;
    let bytes = tokio::fs::read(&full_path)
        .await
        .log_status("Read asset error", StatusCode::NOT_FOUND)?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::CACHE_CONTROL, BUNDLED_CACHE_CONTROL),
        ],
        bytes,
    ))
}

/// GET /animations/{name}.json - verdict animation held in memory
async fn serve_animation(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = file.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)?;
    let animation = state
        .animations
        .by_name(name)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok((
        [(header::CACHE_CONTROL, BUNDLED_CACHE_CONTROL)],
        Json(animation),
    ))
}

/// GET /blobs/{id} - stored JPEG bytes
async fn serve_blob(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let blob_ref: BlobRef = id
        .parse()
        .log_status("Invalid blob id", StatusCode::NOT_FOUND)?;

    let bytes = state
        .store
        .fetch_blob(blob_ref)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            other => {
                tracing::error!(error = %other, "Fetch blob error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(([(header::CONTENT_TYPE, STORED_CONTENT_TYPE)], bytes))
}
