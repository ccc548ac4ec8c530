//! Home page (/)

use axum::{Router, extract::State, http::StatusCode, response::Html, routing::get};
use serde::Serialize;
use std::sync::Arc;

use super::render_page;
use crate::AppState;
use crate::views::Page;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(Page::Home.path(), get(home))
}

#[derive(Serialize)]
struct HomeView {}

async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    render_page(&state, Page::Home, &HomeView {})
}
