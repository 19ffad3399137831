// src/models/plan.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::ActiveStatus;

// Plano de assinatura (tabela `planos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Plan {
    pub id: String,

    #[schema(example = "Plano Habitacional Básico")]
    pub nome: String,

    pub descricao: Option<String>,

    #[schema(example = "150.00")]
    pub valor_mensal: Decimal,

    #[schema(example = "300.00")]
    pub taxa_inscricao: Decimal,

    // No Base44 este campo é o booleano `active`
    pub status: ActiveStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
