// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::UserRole;

// Quem está por trás do token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Admin,
    Operador,
    Cooperado,
}

impl Perfil {
    pub fn is_staff(&self) -> bool {
        matches!(self, Perfil::Admin | Perfil::Operador)
    }
}

impl From<UserRole> for Perfil {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Perfil::Admin,
            UserRole::Operador => Perfil::Operador,
        }
    }
}

// Login de usuário do CRM
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "admin@sanep.coop.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
}

// Login do cooperado (portal do associado)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MemberLoginPayload {
    #[validate(length(min = 1, message = "Informe o número de associado."))]
    #[schema(example = "CS000001")]
    pub numero_associado: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // id do usuário do CRM ou do cooperado
    pub perfil: Perfil,
    pub exp: usize,
    pub iat: usize,
}
