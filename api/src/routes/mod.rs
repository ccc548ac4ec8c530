pub mod about;
pub mod detection;
pub mod health;
pub mod history;
pub mod home;
pub mod media;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode, response::Html};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::constants::MAX_UPLOAD_SIZE;
use crate::services::error::LogErr;
use crate::views::Page;

/// Build all routes for the application
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(home::routes())
        .merge(detection::routes())
        .merge(history::routes())
        .merge(about::routes())
        .merge(media::routes())
        .merge(health::routes())
}

/// The complete application with shared layers applied
pub fn app(state: Arc<AppState>) -> Router {
    build_routes()
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn render_page<T: Serialize>(
    state: &AppState,
    page: Page,
    body: &T,
) -> Result<Html<String>, StatusCode> {
    state
        .views
        .render(page, body)
        .map(Html)
        .log_500("Render page error")
}
