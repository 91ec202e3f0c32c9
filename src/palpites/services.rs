use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    palpites::repo_types::{NewPalpite, PalpiteView},
    state::AppState,
};

pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

#[derive(Debug, Default, Clone)]
pub struct CreatePalpite {
    pub user_id: i64,
    pub img_url: String,
    pub titulo: Option<String>,
    pub link: Option<String>,
}

/// True when the reference ends in a known image extension (query string ignored).
pub fn has_image_extension(img_url: &str) -> bool {
    let path = img_url.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Advisory: anything non-empty passes, inline data and extensionless URLs included.
pub fn is_valid_image_ref(img_url: &str) -> bool {
    has_image_extension(img_url) || !img_url.trim().is_empty()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn create(st: &AppState, input: CreatePalpite) -> AppResult<PalpiteView> {
    if input.user_id <= 0 {
        return Err(AppError::validation("user_id is required"));
    }
    let img_url = input.img_url.trim();
    if img_url.is_empty() {
        return Err(AppError::validation("img_url is required"));
    }
    if !is_valid_image_ref(img_url) {
        return Err(AppError::validation("img_url is not a valid image reference"));
    }
    if !has_image_extension(img_url) {
        debug!(user_id = input.user_id, "img_url has no image extension, accepting as-is");
    }

    let id = st
        .palpites
        .insert(&NewPalpite {
            user_id: input.user_id,
            titulo: non_empty(input.titulo),
            img_url: img_url.to_string(),
            link: non_empty(input.link),
        })
        .await?;

    let row = st
        .palpites
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("palpite {id} vanished right after insert")))?;

    info!(palpite_id = id, user_id = row.user_id, "palpite created");
    Ok(row.into())
}

pub async fn list(st: &AppState, user_id: Option<i64>) -> AppResult<Vec<PalpiteView>> {
    if matches!(user_id, Some(id) if id <= 0) {
        return Err(AppError::validation("user_id must be a positive integer"));
    }
    let rows = st.palpites.list(user_id).await?;
    Ok(rows.into_iter().map(PalpiteView::from).collect())
}

pub async fn get_by_id(st: &AppState, id: i64) -> AppResult<PalpiteView> {
    st.palpites
        .find_by_id(id)
        .await?
        .map(PalpiteView::from)
        .ok_or_else(|| AppError::not_found("palpite not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(user_id: i64, img_url: &str) -> CreatePalpite {
        CreatePalpite {
            user_id,
            img_url: img_url.into(),
            titulo: Some("Flamengo x Vasco".into()),
            link: None,
        }
    }

    #[test]
    fn image_extension_detection() {
        assert!(has_image_extension("https://cdn.example.com/a/b.JPG"));
        assert!(has_image_extension("/uploads/palpites/palpite_1.webp?v=2"));
        assert!(!has_image_extension("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_valid_image_ref("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_valid_image_ref("   "));
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let st = AppState::fake();
        assert!(matches!(create(&st, input(1, "")).await, Err(AppError::Validation(_))));
        assert!(matches!(create(&st, input(0, "a.png")).await, Err(AppError::Validation(_))));
        assert!(matches!(create(&st, input(-3, "a.png")).await, Err(AppError::Validation(_))));
        assert!(st.palpites.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_palpite_reads_back_identically() {
        let st = AppState::fake();
        let mut req = input(4, "https://cdn.example.com/p.png");
        req.link = Some("".into());

        let created = create(&st, req).await.unwrap();
        assert_eq!(created.link, None);
        assert_eq!(created.titulo.as_deref(), Some("Flamengo x Vasco"));

        let fetched = get_by_id(&st, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(get_by_id(&st, created.id).await.unwrap(), fetched);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_user() {
        let st = AppState::fake();
        let a = create(&st, input(1, "a.png")).await.unwrap();
        let b = create(&st, input(2, "b.png")).await.unwrap();
        let c = create(&st, input(1, "c.png")).await.unwrap();

        let ids: Vec<_> = list(&st, None).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [c.id, b.id, a.id]);

        let mine: Vec<_> = list(&st, Some(1)).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(mine, [c.id, a.id]);

        assert!(matches!(list(&st, Some(0)).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let st = AppState::fake();
        assert!(matches!(get_by_id(&st, 42).await, Err(AppError::NotFound(_))));
    }
}
