use serde::{Deserialize, Serialize};

use crate::users::repo_types::UserView;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetAvatarRequest {
    pub user_id: i64,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteAvatarRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub success: bool,
    pub user: UserView,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
