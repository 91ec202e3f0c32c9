use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::UserView,
};

fn check_user_id(user_id: i64) -> AppResult<()> {
    if user_id <= 0 {
        return Err(AppError::validation("user_id is required"));
    }
    Ok(())
}

/// Empty or missing avatar clears the field.
pub async fn set_avatar(st: &AppState, user_id: i64, avatar: Option<&str>) -> AppResult<UserView> {
    check_user_id(user_id)?;
    let avatar = avatar.filter(|a| !a.is_empty());
    if let Some(data) = avatar {
        let max = st.config.avatar_max_bytes;
        if data.len() > max {
            warn!(user_id, size = data.len(), max, "avatar too large");
            return Err(AppError::validation(format!(
                "avatar too large, maximum is {} MiB of encoded data",
                max / (1024 * 1024)
            )));
        }
    }

    let touched = st.users.set_avatar(user_id, avatar).await?;
    if touched == 0 {
        return Err(AppError::not_found("user not found"));
    }

    let row = st
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    info!(user_id, cleared = avatar.is_none(), "avatar updated");
    UserView::try_from(row)
}

pub async fn clear_avatar(st: &AppState, user_id: i64) -> AppResult<()> {
    check_user_id(user_id)?;
    if !st.users.exists(user_id).await? {
        return Err(AppError::not_found("user not found"));
    }

    let touched = st.users.set_avatar(user_id, None).await?;
    if touched == 0 {
        // existed a moment ago
        return Err(AppError::Internal(format!("could not remove avatar of user {user_id}")));
    }

    info!(user_id, "avatar removed");
    Ok(())
}
