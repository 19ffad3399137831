// src/models/email.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Enviado,
    Falhou,
}

// Registro de cada e-mail transacional disparado (tabela `email_logs`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmailLog {
    pub id: String,
    pub destinatario: String,

    #[schema(example = "aprovacao_inscricao")]
    pub template: String,

    pub status: EmailStatus,
    pub erro: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEmailLog {
    pub destinatario: String,
    pub template: String,
    pub status: EmailStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erro: Option<String>,
}

/// Parâmetros nomeados do template de e-mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsEmail {
    pub to_email: String,
    pub to_name: String,
    pub numero_associado: String,
    pub senha: String,
    pub plano_nome: String,
    pub data_aprovacao: String,
}
