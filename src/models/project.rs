// src/models/project.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planejamento,
    EmAndamento,
    Concluido,
    Cancelado,
}

impl From<ProjectStatus> for serde_json::Value {
    fn from(status: ProjectStatus) -> Self {
        let text = match status {
            ProjectStatus::Planejamento => "planejamento",
            ProjectStatus::EmAndamento => "em_andamento",
            ProjectStatus::Concluido => "concluido",
            ProjectStatus::Cancelado => "cancelado",
        };
        serde_json::Value::String(text.to_string())
    }
}

// Empreendimento habitacional (tabela `projetos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,

    #[schema(example = "Residencial Sanep I")]
    pub titulo: String,

    pub descricao: Option<String>,
    pub localizacao: Option<String>,

    pub valor_total: Option<Decimal>,
    pub valor_arrecadado: Option<Decimal>,
    pub unidades: Option<i32>,

    pub status: ProjectStatus,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_conclusao_prevista: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
