use time::{macros::format_description, Date};
use tracing::{info, warn};

use crate::{
    auth::password::hash_password,
    error::{AppError, AppResult},
    state::AppState,
    users::{
        repo::{CPF_TAKEN, EMAIL_TAKEN},
        repo_types::{NewUser, Perfil, Permissions, UserView},
    },
};

pub const INVALID_PERFIL: &str = "invalid perfil, use 'admin' or 'user'";

/// Raw registration input as received from the client.
#[derive(Debug, Default, Clone)]
pub struct Registration {
    pub nome: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub perfil: Option<String>,
}

/// Accepts `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_birth_date(raw: &str) -> AppResult<Date> {
    let iso = format_description!("[year]-[month]-[day]");
    let br = format_description!("[day]/[month]/[year]");
    Date::parse(raw, iso)
        .or_else(|_| Date::parse(raw, br))
        .map_err(|_| AppError::validation("invalid date format, use 'YYYY-MM-DD' or 'DD/MM/YYYY'"))
}

/// Empty or missing means the default role.
pub fn parse_perfil(raw: Option<&str>) -> AppResult<Perfil> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Perfil::User),
        Some(p) => Perfil::parse(p).ok_or_else(|| AppError::validation(INVALID_PERFIL)),
    }
}

pub async fn register(st: &AppState, input: Registration) -> AppResult<UserView> {
    let nome = input.nome.trim();
    let email = input.email.trim();
    let cpf = input.cpf.trim();
    let birth = input.data_nascimento.trim();
    if nome.is_empty()
        || email.is_empty()
        || input.password.is_empty()
        || cpf.is_empty()
        || birth.is_empty()
    {
        return Err(AppError::validation(
            "all fields are required (nome, email, password, cpf, data_nascimento)",
        ));
    }

    let perfil = parse_perfil(input.perfil.as_deref())?;
    let data_nascimento = parse_birth_date(birth)?;

    if st.users.email_exists(email).await? {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }
    if st.users.cpf_exists(cpf).await? {
        warn!("cpf already registered");
        return Err(AppError::Conflict(CPF_TAKEN.into()));
    }

    let password_hash = hash_password(&input.password)?;
    let id = st
        .users
        .insert(&NewUser {
            nome: nome.to_string(),
            email: email.to_string(),
            password_hash,
            cpf: cpf.to_string(),
            data_nascimento,
            perfil,
        })
        .await?;

    let row = st
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("user {id} vanished right after insert")))?;

    info!(user_id = id, %email, perfil = perfil.as_str(), "user registered");
    UserView::try_from(row)
}

pub async fn list(st: &AppState, perfil: Option<Perfil>) -> AppResult<Vec<UserView>> {
    st.users
        .list(perfil)
        .await?
        .into_iter()
        .map(UserView::try_from)
        .collect()
}

pub async fn find_by_email(st: &AppState, email: &str) -> AppResult<UserView> {
    let row = st
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    UserView::try_from(row)
}

pub fn permissions_for(user: &UserView) -> Permissions {
    Permissions::for_perfil(user.perfil)
}
