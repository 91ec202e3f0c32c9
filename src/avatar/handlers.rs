use axum::{
    extract::{DefaultBodyLimit, State},
    routing::put,
    Json, Router,
};
use tracing::instrument;

use crate::{
    avatar::{
        dto::{AvatarResponse, DeleteAvatarRequest, MessageResponse, SetAvatarRequest},
        services,
    },
    error::{ApiJson, AppResult},
    state::AppState,
};

/// Headroom over the avatar ceiling for the JSON around it.
const JSON_ENVELOPE_BYTES: usize = 1024 * 1024;

/// The body limit follows the configured ceiling so oversized avatars reach the
/// service check instead of failing as unreadable JSON.
pub fn avatar_routes(avatar_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/users/avatar",
            put(set_avatar).post(set_avatar).delete(delete_avatar),
        )
        .layer(DefaultBodyLimit::max(
            avatar_max_bytes.saturating_add(JSON_ENVELOPE_BYTES),
        ))
}

#[instrument(skip(state, payload), fields(user_id = payload.user_id))]
pub async fn set_avatar(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SetAvatarRequest>,
) -> AppResult<Json<AvatarResponse>> {
    let user = services::set_avatar(&state, payload.user_id, payload.avatar.as_deref()).await?;
    Ok(Json(AvatarResponse {
        success: true,
        user,
        message: "avatar updated successfully",
    }))
}

#[instrument(skip(state, payload), fields(user_id = payload.user_id))]
pub async fn delete_avatar(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DeleteAvatarRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::clear_avatar(&state, payload.user_id).await?;
    Ok(Json(MessageResponse {
        message: "avatar removed successfully",
    }))
}
