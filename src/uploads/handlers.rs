use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    uploads::services::{self, MAX_UPLOAD_BYTES, PAYLOAD_TOO_LARGE},
};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub image_url: String,
    pub message: &'static str,
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::validation(PAYLOAD_TOO_LARGE)
    } else {
        AppError::validation(format!("could not read upload: {}", e.body_text()))
    }
}

/// POST /upload (multipart, field `image`)
#[instrument(skip(state, headers, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|n| n > MAX_UPLOAD_BYTES as u64) {
        warn!(?declared, "upload rejected before reading body");
        return Err(AppError::validation(PAYLOAD_TOO_LARGE));
    }

    let mut mp = mp.map_err(|e| {
        AppError::validation(format!("expected multipart/form-data: {}", e.body_text()))
    })?;
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        let image_url = services::upload(&state, data, &filename, declared).await?;
        return Ok(Json(UploadResponse {
            success: true,
            image_url,
            message: "upload completed successfully",
        }));
    }

    Err(AppError::validation("multipart field 'image' is required"))
}
