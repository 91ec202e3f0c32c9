use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{ApiJson, ApiPath, ApiQuery, AppResult},
    palpites::{
        dto::{CreatePalpiteRequest, CreatedPalpiteResponse, PalpiteFilter, PalpiteListResponse},
        repo_types::PalpiteView,
        services,
    },
    state::AppState,
};

/// Room for an inline base64 image of the upload ceiling plus the JSON around it.
const PALPITE_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn palpite_routes() -> Router<AppState> {
    Router::new()
        .route("/palpites", get(list_palpites).post(create_palpite))
        .route("/palpites/:id", get(get_palpite))
        .layer(DefaultBodyLimit::max(PALPITE_BODY_LIMIT))
}

#[instrument(skip(state, payload), fields(user_id = payload.user_id))]
pub async fn create_palpite(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePalpiteRequest>,
) -> AppResult<(StatusCode, HeaderMap, Json<CreatedPalpiteResponse>)> {
    let palpite = services::create(&state, payload.into()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/palpites/{}", palpite.id).parse() {
        headers.insert(header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedPalpiteResponse {
            palpite,
            message: "palpite created successfully",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_palpites(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PalpiteFilter>,
) -> AppResult<Json<PalpiteListResponse>> {
    let palpites = services::list(&state, filter.user_id).await?;
    Ok(Json(PalpiteListResponse {
        total: palpites.len(),
        palpites,
        message: "palpites listed successfully",
    }))
}

#[instrument(skip(state))]
pub async fn get_palpite(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<PalpiteView>> {
    Ok(Json(services::get_by_id(&state, id).await?))
}
