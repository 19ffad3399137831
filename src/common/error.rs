// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::RemoteError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Não encontrado: {0}")]
    NotFound(String),

    // Uma busca que deveria ser única casou com várias linhas
    #[error("Registro duplicado em '{0}'")]
    DuplicateRecord(String),

    // A linha lida não cabe no esquema canônico
    #[error("Registro fora do esquema: {0}")]
    InvalidRecord(serde_json::Error),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Remote(remote) => match remote {
                RemoteError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RemoteError::Conflict(_) => StatusCode::CONFLICT,
                RemoteError::Permission(_) => StatusCode::FORBIDDEN,
                RemoteError::NotFound(_) => StatusCode::NOT_FOUND,
                RemoteError::Transport(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::Validation(message) => message,
            AppError::Conflict(message) => message,
            AppError::NotFound(what) => format!("Não encontrado: {}.", what),
            AppError::InvalidCredentials => "Credenciais inválidas.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::Forbidden => "Você não tem permissão para esta operação.".to_string(),
            AppError::Remote(RemoteError::Rejected(detail)) => {
                tracing::warn!("Escrita rejeitada pelo banco: {}", detail);
                "O banco de dados recusou os valores enviados.".to_string()
            }
            AppError::Remote(RemoteError::Conflict(detail)) => {
                tracing::warn!("Violação de unicidade: {}", detail);
                "Já existe um registro com estes dados.".to_string()
            }
            AppError::Remote(RemoteError::Permission(detail)) => {
                tracing::warn!("Permissão negada pelo banco: {}", detail);
                "O banco de dados negou o acesso.".to_string()
            }
            AppError::Remote(RemoteError::NotFound(_)) => "Registro não encontrado.".to_string(),
            AppError::Remote(RemoteError::Transport(e)) => {
                tracing::error!("Falha de comunicação com o banco remoto: {}", e);
                "O banco de dados remoto não respondeu.".to_string()
            }

            // O resto vira 500; o detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
