use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{ApiQuery, AppError, AppResult},
    state::AppState,
    users::{
        dto::{EmailQuery, PermissionsResponse, ProfileQuery, UserListResponse},
        repo_types::Perfil,
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/permissions", get(user_permissions))
        .route("/users/profile", get(users_by_profile))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UserListResponse>> {
    let users = services::list(&state, None).await?;
    Ok(Json(UserListResponse {
        total: users.len(),
        users,
        profile: None,
        message: "users listed successfully",
    }))
}

#[instrument(skip(state))]
pub async fn user_permissions(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<EmailQuery>,
) -> AppResult<Json<PermissionsResponse>> {
    let email = q.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::validation("email is required"));
    }
    let user = services::find_by_email(&state, email).await?;
    let permissions = services::permissions_for(&user);
    Ok(Json(PermissionsResponse {
        user,
        permissions,
        message: "permissions checked successfully",
    }))
}

#[instrument(skip(state))]
pub async fn users_by_profile(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ProfileQuery>,
) -> AppResult<Json<UserListResponse>> {
    let raw = q.profile.as_deref().map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::validation("query parameter 'profile' is required"));
    }
    let perfil = Perfil::parse(raw).ok_or_else(|| AppError::validation(services::INVALID_PERFIL))?;

    let users = services::list(&state, Some(perfil)).await?;
    Ok(Json(UserListResponse {
        total: users.len(),
        users,
        profile: Some(perfil),
        message: "users found successfully",
    }))
}
