use tracing::{error, info, warn};

use crate::{
    auth::password::verify_password,
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::UserView,
};

pub const INVALID_CREDENTIALS: &str = "invalid email or password";

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(INVALID_CREDENTIALS.into())
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(st: &AppState, email: &str, password: &str) -> AppResult<UserView> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("email and password are required"));
    }

    let Some(user) = st.users.find_by_email(email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid_credentials());
    };

    match verify_password(password, &user.password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(%email, user_id = user.id, "login invalid password");
            return Err(invalid_credentials());
        }
        Err(e) => {
            error!(error = %e, user_id = user.id, "stored hash unusable");
            return Err(invalid_credentials());
        }
    }

    info!(user_id = user.id, %email, "user logged in");
    UserView::try_from(user)
}
