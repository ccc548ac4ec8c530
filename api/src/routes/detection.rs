//! Detection page (/detect): upload form, classification and saving

use axum::{
    Router,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use super::render_page;
use crate::AppState;
use crate::constants::{MAX_UPLOAD_SIZE, STORED_CONTENT_TYPE, UPLOAD_FIELD};
use crate::preprocess::is_accepted_filename;
use crate::services::detection::{self, Detection, DetectionError};
use crate::services::error::LogErr;
use crate::store::Persistence;
use crate::views::{Notice, Page, Verdict};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(Page::Detection.path(), get(upload_form).post(detect))
}

#[derive(Debug, Error)]
enum UploadError {
    #[error("Choose an image to upload.")]
    Missing,

    #[error("Unsupported file {0:?}. Upload a jpg, jpeg or png image.")]
    Unsupported(String),

    #[error("Could not read the upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::Multipart(e) => e.status(),
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> String {
        match self.status() {
            StatusCode::PAYLOAD_TOO_LARGE => format!(
                "The image is too large. Uploads are limited to {} MB.",
                MAX_UPLOAD_SIZE / (1024 * 1024)
            ),
            _ => self.to_string(),
        }
    }
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

#[derive(Serialize, Default)]
struct DetectionView {
    upload_error: Option<String>,
    notice: Option<Notice>,
    verdict: Option<Verdict>,
    filename: Option<String>,
    image_src: Option<String>,
}

/// GET /detect - empty upload form
async fn upload_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    render_page(&state, Page::Detection, &DetectionView::default())
}

/// POST /detect - classify the uploaded image, show the verdict, save it
async fn detect(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::info!(error = %e, "upload rejected");
            return rejected(&state, e.status(), e.message());
        }
    };

    let classifier = state.classifier.clone();
    let bytes = upload.bytes.clone();
    let outcome = tokio::task::spawn_blocking(move || detection::detect(classifier.as_ref(), &bytes))
        .await
        .log_500("Detection task error")?;

    let Detection { label, jpeg } = match outcome {
        Ok(detection) => detection,
        Err(DetectionError::Preprocess(e)) => {
            tracing::info!(filename = %upload.filename, error = %e, "upload rejected");
            return rejected(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("The uploaded file is not a readable image: {e}"),
            );
        }
        Err(e @ DetectionError::Classify(_)) => return Err(e).log_500("Classification error"),
    };

    tracing::info!(filename = %upload.filename, %label, "image classified");

    let notice = match state.store.save(&jpeg, &upload.filename, label).await {
        Ok(Persistence::Available(_)) => None,
        Ok(Persistence::Unavailable) => Some(Notice::warning(
            "The result could not be saved because the database is unavailable.",
        )),
        Err(e) => {
            tracing::error!(filename = %upload.filename, error = %e, "save detection error");
            Some(Notice::error(format!(
                "Something went wrong while saving the result: {e}"
            )))
        }
    };

    let view = DetectionView {
        upload_error: None,
        notice,
        verdict: Some(label.into()),
        image_src: Some(data_uri(&jpeg)),
        filename: Some(upload.filename),
    };
    render_page(&state, Page::Detection, &view).map(IntoResponse::into_response)
}

/// Pull the first file out of the `image` field
async fn read_upload(mut multipart: Multipart) -> Result<Upload, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if filename.is_empty() && bytes.is_empty() {
            return Err(UploadError::Missing);
        }
        if !is_accepted_filename(&filename) {
            return Err(UploadError::Unsupported(filename));
        }
        return Ok(Upload { filename, bytes });
    }

    Err(UploadError::Missing)
}

fn rejected(state: &AppState, status: StatusCode, message: String) -> Result<Response, StatusCode> {
    let view = DetectionView {
        upload_error: Some(message),
        ..DetectionView::default()
    };
    let page = render_page(state, Page::Detection, &view)?;
    Ok((status, page).into_response())
}

pub(crate) fn data_uri(jpeg: &[u8]) -> String {
    format!("data:{};base64,{}", STORED_CONTENT_TYPE, STANDARD.encode(jpeg))
}
