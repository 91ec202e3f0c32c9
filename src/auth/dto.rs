use serde::Deserialize;

use crate::users::services::Registration;

/// Request body for login. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
}

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub perfil: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Self {
            nome: r.nome,
            email: r.email,
            password: r.password,
            cpf: r.cpf,
            data_nascimento: r.data_nascimento,
            perfil: r.perfil,
        }
    }
}
