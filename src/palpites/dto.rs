use serde::{Deserialize, Serialize};

use crate::palpites::{repo_types::PalpiteView, services::CreatePalpite};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePalpiteRequest {
    pub user_id: i64,
    pub img_url: String,
    pub titulo: Option<String>,
    pub link: Option<String>,
}

impl From<CreatePalpiteRequest> for CreatePalpite {
    fn from(r: CreatePalpiteRequest) -> Self {
        Self {
            user_id: r.user_id,
            img_url: r.img_url,
            titulo: r.titulo,
            link: r.link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PalpiteFilter {
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPalpiteResponse {
    pub palpite: PalpiteView,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PalpiteListResponse {
    pub palpites: Vec<PalpiteView>,
    pub total: usize,
    pub message: &'static str,
}
