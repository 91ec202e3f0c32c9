use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct PalpiteRow {
    pub id: i64,
    pub user_id: i64,
    pub titulo: Option<String>,
    pub img_url: String,
    pub link: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPalpite {
    pub user_id: i64,
    pub titulo: Option<String>,
    pub img_url: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PalpiteView {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    pub img_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PalpiteRow> for PalpiteView {
    fn from(r: PalpiteRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            titulo: r.titulo,
            img_url: r.img_url,
            link: r.link,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
