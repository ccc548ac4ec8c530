//! About page (/about)

use axum::{Router, extract::State, http::StatusCode, response::Html, routing::get};
use serde::Serialize;
use std::sync::Arc;

use super::render_page;
use crate::AppState;
use crate::views::Page;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(Page::About.path(), get(about))
}

#[derive(Serialize)]
struct AboutView {}

async fn about(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    render_page(&state, Page::About, &AboutView {})
}
