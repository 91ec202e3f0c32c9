use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod services;

pub fn router(avatar_max_bytes: usize) -> Router<AppState> {
    handlers::avatar_routes(avatar_max_bytes)
}
