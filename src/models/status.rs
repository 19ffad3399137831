// src/models/status.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// Status "ativo/inativo" compartilhado por cooperados, credenciais, planos e usuários do CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ActiveStatus {
    #[serde(rename = "ativo")]
    Active,
    #[serde(rename = "inativo")]
    Inactive,
}

impl ActiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStatus::Active => "ativo",
            ActiveStatus::Inactive => "inativo",
        }
    }
}

// Permite usar o enum direto num Filter: `.eq("status", ActiveStatus::Active)`
impl From<ActiveStatus> for Value {
    fn from(status: ActiveStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}
