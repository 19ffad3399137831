// src/models/enrollment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use super::member::Member;

// O CHECK do banco aceita exatamente estes três valores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pendente,
    Aprovado,
    Rejeitado,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pendente => "pendente",
            EnrollmentStatus::Aprovado => "aprovado",
            EnrollmentStatus::Rejeitado => "rejeitado",
        }
    }
}

impl From<EnrollmentStatus> for Value {
    fn from(status: EnrollmentStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}

// Inscrição pública (tabela `inscricoes_publicas`; no Base44, a entidade legada `Inscricao`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: String,

    pub nome_completo: String,
    pub cpf: String,
    pub email: String,
    pub telefone: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_nascimento: Option<NaiveDate>,

    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,

    pub plano_id: String,
    pub status: EnrollmentStatus,

    // URLs públicas do bucket "documents"
    pub documento_identidade_url: Option<String>,
    pub comprovante_residencia_url: Option<String>,
    pub comprovante_renda_url: Option<String>,

    pub observacoes: Option<String>,
    pub motivo_rejeicao: Option<String>,

    pub cooperado_id: Option<String>,
    pub data_aprovacao: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Payload do formulário público de inscrição
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EnrollmentPayload {
    #[validate(length(min = 3, message = "O nome deve ter no mínimo 3 caracteres."))]
    #[schema(example = "Maria da Silva")]
    pub nome_completo: String,

    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "123.456.789-00")]
    pub cpf: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@email.com")]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-20")]
    pub data_nascimento: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2, message = "Use a sigla do estado (ex.: SP)."))]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,

    #[validate(length(min = 1, message = "Escolha um plano."))]
    pub plano_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL de documento inválida."))]
    pub documento_identidade_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL de documento inválida."))]
    pub comprovante_residencia_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL de documento inválida."))]
    pub comprovante_renda_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

/// CPF só com dígitos: exatamente 11.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn validate_cpf(cpf: &str) -> Result<(), validator::ValidationError> {
    if normalize_cpf(cpf).len() == 11 {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("invalid_cpf");
    err.message = Some("O CPF deve ter 11 dígitos.".into());
    Err(err)
}

// O que é gravado na submissão: o formulário (CPF já normalizado) + status inicial
#[derive(Debug, Clone, Serialize)]
pub struct NewEnrollment {
    #[serde(flatten)]
    pub fields: EnrollmentPayload,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectEnrollmentPayload {
    #[schema(example = "Documentação incompleta")]
    pub motivo: Option<String>,
}

// Resultado da aprovação
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalOutcome {
    pub cooperado: Member,
    pub email_enviado: bool,

    // Só aparece quando o e-mail não saiu, para o operador repassar ao cooperado
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha_provisoria: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PasswordResetOutcome {
    pub email_enviado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha_provisoria: Option<String>,
}
