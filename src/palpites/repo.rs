use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::palpites::repo_types::{NewPalpite, PalpiteRow};

/// Persistence for the `palpites` table.
#[async_trait]
pub trait PalpiteRepo: Send + Sync {
    async fn insert(&self, palpite: &NewPalpite) -> AppResult<i64>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<PalpiteRow>>;
    /// Newest first, optionally restricted to one user.
    async fn list(&self, user_id: Option<i64>) -> AppResult<Vec<PalpiteRow>>;
}

#[derive(Clone)]
pub struct PgPalpiteRepo {
    db: PgPool,
}

impl PgPalpiteRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PalpiteRepo for PgPalpiteRepo {
    async fn insert(&self, palpite: &NewPalpite) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO palpites (user_id, titulo, img_url, link)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(palpite.user_id)
        .bind(palpite.titulo.as_deref())
        .bind(&palpite.img_url)
        .bind(palpite.link.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<PalpiteRow>> {
        let row = sqlx::query_as::<_, PalpiteRow>(
            r#"
            SELECT id, user_id, titulo, img_url, link, created_at, updated_at
              FROM palpites
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list(&self, user_id: Option<i64>) -> AppResult<Vec<PalpiteRow>> {
        let rows = sqlx::query_as::<_, PalpiteRow>(
            r#"
            SELECT id, user_id, titulo, img_url, link, created_at, updated_at
              FROM palpites
             WHERE $1::bigint IS NULL OR user_id = $1
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
