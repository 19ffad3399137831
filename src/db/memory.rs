// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::remote::{text_value, Filter, Record, RemoteError, RemoteStore};

/// Banco em memória, com as mesmas regras de CHECK/UNIQUE do esquema do Supabase.
/// Usado no desenvolvimento local (`DATA_BACKEND=memory`) e nos testes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    checks: HashMap<(String, String), Vec<String>>,
    uniques: Vec<(String, String)>,
    columns: HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// As constraints que o projeto Supabase aplica (ver `sql/schema.sql`).
    pub fn with_default_constraints() -> Self {
        Self::new()
            .with_check("cooperados", "status", &["ativo", "inativo"])
            .with_unique("cooperados", "numero_associado")
            .with_unique("cooperados", "cpf")
            .with_check("cooperado_auth", "status", &["ativo", "inativo"])
            .with_unique("cooperado_auth", "cooperado_id")
            .with_unique("cooperado_auth", "email")
            .with_check("planos", "status", &["ativo", "inativo"])
            .with_check("inscricoes_publicas", "status", &["pendente", "aprovado", "rejeitado"])
            .with_check("pagamentos", "tipo", &["inscricao", "mensalidade", "outro"])
            .with_check("pagamentos", "status", &["pendente", "pago", "atrasado", "cancelado"])
            .with_check(
                "projetos",
                "status",
                &["planejamento", "em_andamento", "concluido", "cancelado"],
            )
            .with_check("crm_usuarios", "perfil", &["admin", "operador"])
            .with_check("crm_usuarios", "status", &["ativo", "inativo"])
            .with_unique("crm_usuarios", "email")
            .with_check("email_logs", "status", &["enviado", "falhou"])
    }

    /// CHECK (column IN (...)). Valores nulos passam, como no Postgres.
    pub fn with_check(mut self, table: &str, column: &str, allowed: &[&str]) -> Self {
        self.checks.insert(
            (table.to_string(), column.to_string()),
            allowed.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.uniques.push((table.to_string(), column.to_string()));
        self
    }

    /// Declara as colunas de uma tabela (usado pela verificação de esquema).
    pub fn with_columns(mut self, table: &str, columns: &[&str]) -> Self {
        self.columns.insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    fn validate(&self, table: &str, row: &Record, others: &[&Record]) -> Result<(), RemoteError> {
        for ((t, column), allowed) in &self.checks {
            if t != table {
                continue;
            }
            if let Some(value) = row.get(column).and_then(text_value) {
                if !allowed.contains(&value) {
                    return Err(RemoteError::Rejected(format!(
                        "new row for relation \"{}\" violates check constraint \"{}_{}_check\"",
                        table, table, column
                    )));
                }
            }
        }

        for (t, column) in &self.uniques {
            if t != table {
                continue;
            }
            let Some(value) = row.get(column).and_then(text_value) else {
                continue;
            };
            let taken = others
                .iter()
                .any(|other| other.get(column).and_then(text_value).as_ref() == Some(&value));
            if taken {
                return Err(RemoteError::Conflict(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    table, column
                )));
            }
        }

        Ok(())
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, mut record: Record) -> Result<Record, RemoteError> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        if !record.contains_key("id") {
            record.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        let created = record.get("created_at").cloned().unwrap_or_else(now);
        record.entry("created_at").or_insert_with(|| created.clone());
        record.entry("updated_at").or_insert(created);

        let others: Vec<&Record> = rows.iter().collect();
        self.validate(table, &record, &others)?;

        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let stamp = now();
        let mut changed: Vec<(usize, Record)> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if !filter.matches(row) {
                continue;
            }
            let mut updated = row.clone();
            for (key, value) in &fields {
                updated.insert(key.clone(), value.clone());
            }
            if !fields.contains_key("updated_at") {
                updated.insert("updated_at".into(), stamp.clone());
            }
            changed.push((index, updated));
        }

        // Valida tudo antes de gravar: ou todas as linhas mudam, ou nenhuma.
        for (index, updated) in &changed {
            let others: Vec<&Record> = rows
                .iter()
                .enumerate()
                .filter(|(i, _)| i != index)
                .map(|(_, r)| r)
                .collect();
            self.validate(table, updated, &others)?;
        }

        for (index, updated) in &changed {
            rows[*index] = updated.clone();
        }
        Ok(changed.into_iter().map(|(_, r)| r).collect())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Record>, Vec<Record>) =
            rows.drain(..).partition(|r| filter.matches(r));
        *rows = kept;
        Ok(removed)
    }

    async fn missing_columns(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<String>, RemoteError> {
        // Sem declaração a tabela é "schemaless": qualquer coluna é aceita.
        let Some(declared) = self.columns.get(table) else {
            return Ok(Vec::new());
        };
        Ok(columns
            .iter()
            .filter(|c| !declared.contains(c))
            .cloned()
            .collect())
    }
}
