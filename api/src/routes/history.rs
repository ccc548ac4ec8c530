//! History page (/history): stored verdicts, newest first

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::detection::data_uri;
use super::render_page;
use crate::AppState;
use crate::constants::MAX_HISTORY_PAGE_SIZE;
use crate::models::{DetectionRecord, ListRange};
use crate::store::{Persistence, StoreError};
use crate::views::{Notice, Page, Verdict};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(Page::History.path(), get(history))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Serialize)]
struct HistoryEntry {
    filename: String,
    verdict: Verdict,
    image_src: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct HistoryView {
    notice: Option<Notice>,
    entries: Vec<HistoryEntry>,
    next_page: Option<String>,
}

/// GET /history - every saved detection with its image
async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Html<String>, StatusCode> {
    let range = ListRange::new(
        query.limit.map(|l| l.min(MAX_HISTORY_PAGE_SIZE)),
        query.offset.unwrap_or(0),
    );

    let (records, notice) = match state.store.list_recent(range).await {
        Ok(Persistence::Available(records)) => (records, None),
        Ok(Persistence::Unavailable) => (
            Vec::new(),
            Some(Notice::warning(
                "History cannot be loaded because the database is unavailable.",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "list detections error");
            (
                Vec::new(),
                Some(Notice::error(format!(
                    "Something went wrong while loading the history: {e}"
                ))),
            )
        }
    };

    let next_page = match range.limit {
        Some(limit) if records.len() as i64 == limit => Some(format!(
            "{}?limit={}&offset={}",
            Page::History.path(),
            limit,
            range.offset + limit
        )),
        _ => None,
    };

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        entries.push(load_entry(&state, record).await);
    }

    let view = HistoryView {
        notice,
        entries,
        next_page,
    };
    render_page(&state, Page::History, &view)
}

/// A missing or unreadable blob only affects its own entry
async fn load_entry(state: &AppState, record: DetectionRecord) -> HistoryEntry {
    let (image_src, error) = match state.store.fetch_blob(record.blob_ref).await {
        Ok(bytes) => (Some(data_uri(&bytes)), None),
        Err(StoreError::NotFound(blob_ref)) => {
            tracing::warn!(id = record.id, %blob_ref, "history image missing");
            (None, Some("The stored image could not be found.".to_string()))
        }
        Err(e) => {
            tracing::error!(id = record.id, error = %e, "fetch history image error");
            (None, Some(format!("The stored image could not be loaded: {e}")))
        }
    };

    HistoryEntry {
        filename: record.filename,
        verdict: record.label.into(),
        image_src,
        error,
    }
}
