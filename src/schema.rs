// src/schema.rs
//
// Verificação declarativa do esquema: cada adaptador diz quais colunas precisa,
// e o backend diz quais delas não existem.

use serde::Serialize;

use crate::{
    common::error::AppError,
    config::Backend,
    db::RemoteError,
    entities::{Entities, Entity, EntityAdapter, EntityKind},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    MissingTable(String),
    MissingColumns(Vec<String>),
    // O backend não sabe responder (ex.: Base44)
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub entity: EntityKind,
    pub backend: Backend,
    pub table: &'static str,
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl TableReport {
    /// Tabela ou coluna faltando, ou falha ao consultar.
    pub fn is_problem(&self) -> bool {
        matches!(
            self.status,
            CheckStatus::MissingTable(_) | CheckStatus::MissingColumns(_) | CheckStatus::Failed(_)
        )
    }
}

pub async fn verify(entities: &Entities) -> Vec<TableReport> {
    vec![
        check(&entities.members).await,
        check(&entities.credentials).await,
        check(&entities.plans).await,
        check(&entities.projects).await,
        check(&entities.payments).await,
        check(&entities.enrollments).await,
        check(&entities.notifications).await,
        check(&entities.users).await,
        check(&entities.email_logs).await,
    ]
}

async fn check<T: Entity>(adapter: &EntityAdapter<T>) -> TableReport {
    let status = match adapter.missing_columns().await {
        Ok(missing) if missing.is_empty() => CheckStatus::Ok,
        Ok(missing) => CheckStatus::MissingColumns(missing),
        Err(AppError::Remote(RemoteError::Schema(detail))) => CheckStatus::MissingTable(detail),
        Err(AppError::Remote(RemoteError::Unsupported(detail))) => CheckStatus::Skipped(detail),
        Err(e) => CheckStatus::Failed(e.to_string()),
    };

    match &status {
        CheckStatus::Ok => tracing::debug!(table = adapter.table(), "Esquema ok"),
        CheckStatus::Skipped(_) => {
            tracing::info!(table = adapter.table(), "Verificação de esquema ignorada")
        }
        problem => tracing::warn!(table = adapter.table(), ?problem, "Problema no esquema"),
    }

    TableReport {
        entity: T::KIND,
        backend: adapter.backend(),
        table: adapter.table(),
        status,
    }
}
