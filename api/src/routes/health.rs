//! Health check (/health): liveness and persistence mode

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::store::Persistence;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

/// GET /health - liveness plus persistence mode
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = match state.store.ping().await {
        Ok(Persistence::Available(())) => "available",
        Ok(Persistence::Unavailable) => "degraded",
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            "unreachable"
        }
    };
    Json(HealthResponse {
        status: "ok",
        store,
    })
}
