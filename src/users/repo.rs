use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::users::repo_types::{NewUser, Perfil, UserRow};

pub const EMAIL_TAKEN: &str = "email already registered";
pub const CPF_TAKEN: &str = "cpf already registered";

const USER_COLUMNS: &str =
    "id, nome, email, password, cpf, data_nascimento, perfil, avatar, created_at, updated_at";

/// Persistence for the `users` table.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserRow>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>>;
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn cpf_exists(&self, cpf: &str) -> AppResult<bool>;
    async fn exists(&self, id: i64) -> AppResult<bool>;
    /// Inserts and returns the generated id. Unique violations surface as `Conflict`.
    async fn insert(&self, user: &NewUser) -> AppResult<i64>;
    /// Newest first.
    async fn list(&self, perfil: Option<Perfil>) -> AppResult<Vec<UserRow>>;
    /// Returns the number of rows touched.
    async fn set_avatar(&self, id: i64, avatar: Option<&str>) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn cpf_exists(&self, cpf: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE cpf = $1)")
            .bind(cpf)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn insert(&self, user: &NewUser) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (nome, email, password, cpf, data_nascimento, perfil)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.nome)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.cpf)
        .bind(user.data_nascimento)
        .bind(user.perfil.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    async fn list(&self, perfil: Option<Perfil>) -> AppResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL OR perfil = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(perfil.map(|p| p.as_str()))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn set_avatar(&self, id: i64, avatar: Option<&str>) -> AppResult<u64> {
        let res = sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}

/// Violations of `users_email_key` / `users_cpf_key` become `Conflict`.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some(c) if c.contains("cpf") => AppError::Conflict(CPF_TAKEN.into()),
                _ => AppError::Conflict(EMAIL_TAKEN.into()),
            };
        }
    }
    AppError::Database(e)
}
