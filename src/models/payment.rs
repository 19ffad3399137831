// src/models/payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Inscricao,
    Mensalidade,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pendente,
    Pago,
    Atrasado,
    Cancelado,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pendente => "pendente",
            PaymentStatus::Pago => "pago",
            PaymentStatus::Atrasado => "atrasado",
            PaymentStatus::Cancelado => "cancelado",
        }
    }
}

impl From<PaymentStatus> for Value {
    fn from(status: PaymentStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}

// Cobrança de um cooperado (tabela `pagamentos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: String,
    pub cooperado_id: String,
    pub plano_id: Option<String>,

    #[schema(example = "300.00")]
    pub valor: Decimal,

    pub tipo: PaymentKind,
    pub status: PaymentStatus,

    #[schema(value_type = String, format = Date)]
    pub data_vencimento: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,

    pub descricao: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    pub cooperado_id: String,
    pub plano_id: Option<String>,
    pub valor: Decimal,
    pub tipo: PaymentKind,
    pub status: PaymentStatus,
    pub data_vencimento: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}
