use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Perfil, Permissions, UserView};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(alias = "perfil")]
    pub profile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Perfil>,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub user: UserView,
    pub permissions: Permissions,
    pub message: &'static str,
}
