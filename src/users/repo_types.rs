use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::error::AppError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Closed set of roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Admin,
    User,
}

impl Perfil {
    pub fn as_str(&self) -> &'static str {
        match self {
            Perfil::Admin => "admin",
            Perfil::User => "user",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Perfil::Admin),
            "user" => Some(Perfil::User),
            _ => None,
        }
    }
}

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub password: String, // argon2 PHC string
    pub cpf: String,
    pub data_nascimento: Date,
    pub perfil: String,
    pub avatar: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Values for a fresh insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub password_hash: String,
    pub cpf: String,
    pub data_nascimento: Date,
    pub perfil: Perfil,
}

/// Sanitized user: never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub cpf: String,
    #[serde(with = "iso_date")]
    pub data_nascimento: Date,
    pub perfil: Perfil,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub has_permission: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub is_admin: bool,
    pub has_permission: bool,
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub can_manage_all: bool,
}

impl Permissions {
    pub fn for_perfil(perfil: Perfil) -> Self {
        let is_admin = perfil == Perfil::Admin;
        // every valid role carries the base permission
        let has_permission = matches!(perfil, Perfil::Admin | Perfil::User);
        Self {
            is_admin,
            has_permission,
            can_create: has_permission,
            can_read: has_permission,
            can_update: is_admin,
            can_delete: is_admin,
            can_manage_all: is_admin,
        }
    }
}

impl TryFrom<UserRow> for UserView {
    type Error = AppError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let perfil = Perfil::parse(&r.perfil).ok_or_else(|| {
            AppError::Internal(format!("user {} has unknown perfil {:?}", r.id, r.perfil))
        })?;
        let perms = Permissions::for_perfil(perfil);
        Ok(Self {
            id: r.id,
            nome: r.nome,
            email: r.email,
            cpf: r.cpf,
            data_nascimento: r.data_nascimento,
            perfil,
            avatar: r.avatar.filter(|a| !a.is_empty()),
            is_admin: perms.is_admin,
            has_permission: perms.has_permission,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
