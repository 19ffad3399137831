// src/models/member.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::ActiveStatus;

// ---
// 1. Cooperado (tabela `cooperados`)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: String,

    #[schema(example = "CS000001")]
    pub numero_associado: String,

    #[schema(example = "Maria da Silva")]
    pub nome_completo: String,

    #[schema(example = "12345678900")]
    pub cpf: String,

    pub email: String,
    pub telefone: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_nascimento: Option<NaiveDate>,

    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,

    pub plano_id: Option<String>,
    pub status: ActiveStatus,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_adesao: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Campos gravados na criação (o banco gera id e timestamps)
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub numero_associado: String,
    pub nome_completo: String,
    pub cpf: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
    pub plano_id: Option<String>,
    pub status: ActiveStatus,
    pub data_adesao: NaiveDate,
}

// ---
// 2. Credencial de acesso do cooperado (tabela `cooperado_auth`)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Credential {
    pub id: String,
    pub cooperado_id: String,
    pub email: String,

    #[serde(skip_serializing)] // nunca sai numa resposta
    #[schema(ignore)]
    pub password_hash: String,

    pub status: ActiveStatus,
    pub ultimo_acesso: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCredential {
    pub cooperado_id: String,
    pub email: String,
    pub password_hash: String,
    pub status: ActiveStatus,
}
