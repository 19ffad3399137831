// src/entities/adapter.rs

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{mapping::FieldMapping, EntityKind};
use crate::{
    common::error::AppError,
    config::Backend,
    db::{remote::text_value, Filter, Record, RemoteStore},
    entities::mapping::FieldRule,
};

/// O que cada entidade do domínio declara para ganhar um adaptador.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Tabela no Supabase/Postgres (e no banco em memória).
    const TABLE: &'static str;

    /// Nome da entidade no Base44.
    const BASE44_ENTITY: &'static str;

    /// Colunas canônicas que o adaptador lê e escreve.
    const COLUMNS: &'static [&'static str];

    /// Chave natural aceita em `update` além do id (ex.: `email`).
    const NATURAL_KEY: Option<&'static str> = None;

    /// Regras específicas da entidade no Base44 (além dos timestamps).
    fn base44_rules() -> Vec<FieldRule> {
        Vec::new()
    }

    /// Valores que o banco preenche quando a coluna é omitida (`DEFAULT` em
    /// `sql/schema.sql`); usados só na checagem antes de um insert.
    fn column_defaults() -> Record {
        Record::new()
    }

    fn adapter(entities: &super::Entities) -> &EntityAdapter<Self>;
}

/// Como um registro é endereçado num `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(String),
    NaturalKey(String),
}

/// CRUD uniforme sobre uma tabela remota.
pub struct EntityAdapter<T> {
    store: Arc<dyn RemoteStore>,
    backend: Backend,
    table: &'static str,
    mapping: FieldMapping,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: self.backend,
            table: self.table,
            mapping: self.mapping.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityAdapter<T> {
    pub fn new(store: Arc<dyn RemoteStore>, backend: Backend) -> Self {
        let (table, mapping) = match backend {
            Backend::Base44 => {
                let mut rules = vec![
                    FieldRule::NaiveTimestamp { canonical: "created_at", native: "created_date" },
                    FieldRule::NaiveTimestamp { canonical: "updated_at", native: "updated_date" },
                ];
                rules.extend(T::base44_rules());
                (T::BASE44_ENTITY, FieldMapping::new(rules))
            }
            Backend::Supabase | Backend::Postgres | Backend::Memory => {
                (T::TABLE, FieldMapping::identity())
            }
        };

        Self {
            store,
            backend,
            table,
            mapping,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub async fn list(&self) -> Result<Vec<T>, AppError> {
        self.filter(&Filter::new()).await
    }

    /// Linhas que casam com todos os critérios; critérios vazios = `list()`.
    pub async fn filter(&self, criteria: &Filter) -> Result<Vec<T>, AppError> {
        let native = self.mapping.filter_to_native(criteria);
        let rows = self.store.select(self.table, &native).await?;
        rows.into_iter().map(|r| self.decode(r)).collect()
    }

    pub async fn find_one(&self, criteria: &Filter) -> Result<Option<T>, AppError> {
        Ok(self.filter(criteria).await?.into_iter().next())
    }

    /// Como `find_one`, mas mais de uma linha é erro, não escolha arbitrária.
    pub async fn find_unique(&self, criteria: &Filter) -> Result<Option<T>, AppError> {
        let mut rows = self.filter(criteria).await?;
        if rows.len() > 1 {
            tracing::error!(
                table = self.table,
                matches = rows.len(),
                "Busca que deveria ser única retornou várias linhas"
            );
            return Err(AppError::DuplicateRecord(self.table.to_string()));
        }
        Ok(rows.pop())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError> {
        self.find_one(&Filter::by_id(id)).await
    }

    /// Insere uma linha e devolve a linha criada, com os campos gerados pelo servidor.
    pub async fn create<F: Serialize + ?Sized>(&self, fields: &F) -> Result<T, AppError> {
        let fields = to_record(fields)?;

        // O que o servidor gera entra como marcador; o resto precisa caber em `T`.
        let mut candidate = Record::new();
        candidate.insert("id".to_string(), Value::String(String::new()));
        candidate.insert("created_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        candidate.extend(T::column_defaults());
        candidate.extend(fields.clone());
        self.check_fits(candidate)?;

        let record = self.mapping.to_native(fields);
        let created = self.store.insert(self.table, record).await?;
        self.decode(created)
    }

    pub async fn update<F: Serialize + ?Sized>(
        &self,
        identifier: &Identifier,
        fields: &F,
    ) -> Result<T, AppError> {
        let current = match identifier {
            Identifier::Id(id) => self.current_row(id).await?,
            Identifier::NaturalKey(value) => self.resolve_natural_key(value).await?,
        };
        let id = current
            .get("id")
            .and_then(text_value)
            .ok_or_else(|| AppError::Validation(format!("{} sem id", self.table)))?;

        // A linha resultante precisa caber em `T` antes de ir para o backend.
        let fields = to_record(fields)?;
        let mut candidate = current;
        candidate.extend(fields.clone());
        self.check_fits(candidate)?;

        let record = self.mapping.to_native(fields);
        let native_filter = self.mapping.filter_to_native(&Filter::by_id(&id));
        let mut rows = self.store.update(self.table, &native_filter, record).await?;

        // Zero linhas afetadas nunca é sucesso.
        match rows.len() {
            0 => Err(AppError::NotFound(format!("{} '{}'", self.table, id))),
            1 => self.decode(rows.remove(0)),
            _ => Err(AppError::DuplicateRecord(self.table.to_string())),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let native_filter = self.mapping.filter_to_native(&Filter::by_id(id));
        let removed = self.store.delete(self.table, &native_filter).await?;
        if removed.is_empty() {
            return Err(AppError::NotFound(format!("{} '{}'", self.table, id)));
        }
        Ok(())
    }

    /// Colunas canônicas (já traduzidas para nomes nativos) que faltam no backend.
    pub async fn missing_columns(&self) -> Result<Vec<String>, AppError> {
        let columns: Vec<String> = T::COLUMNS
            .iter()
            .map(|c| self.mapping.native_column(c))
            .collect();
        Ok(self.store.missing_columns(self.table, &columns).await?)
    }

    /// A linha atual (já canônica) com este id.
    async fn current_row(&self, id: &str) -> Result<Record, AppError> {
        let native = self.mapping.filter_to_native(&Filter::by_id(id));
        let mut rows = self.store.select(self.table, &native).await?;
        match rows.len() {
            0 => Err(AppError::NotFound(format!("{} '{}'", self.table, id))),
            1 => Ok(self.mapping.to_canonical(rows.remove(0))),
            _ => Err(AppError::DuplicateRecord(self.table.to_string())),
        }
    }

    async fn resolve_natural_key(&self, value: &str) -> Result<Record, AppError> {
        let Some(column) = T::NATURAL_KEY else {
            return Err(AppError::Validation(format!(
                "{} não aceita atualização por chave natural",
                self.table
            )));
        };

        let native = self.mapping.filter_to_native(&Filter::new().eq(column, value));
        let mut rows = self.store.select(self.table, &native).await?;
        match rows.len() {
            0 => Err(AppError::NotFound(format!("{} com {} '{}'", self.table, column, value))),
            1 => Ok(self.mapping.to_canonical(rows.remove(0))),
            _ => Err(AppError::DuplicateRecord(self.table.to_string())),
        }
    }

    fn check_fits(&self, candidate: Record) -> Result<(), AppError> {
        serde_json::from_value::<T>(Value::Object(candidate))
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(table = self.table, "Escrita recusada antes do envio: {}", e);
                AppError::Validation(format!("Valores inválidos para {}: {}", self.table, e))
            })
    }

    fn decode(&self, record: Record) -> Result<T, AppError> {
        let canonical = self.mapping.to_canonical(record);
        serde_json::from_value(Value::Object(canonical)).map_err(AppError::InvalidRecord)
    }
}

fn to_record<F: Serialize + ?Sized>(fields: &F) -> Result<Record, AppError> {
    match serde_json::to_value(fields).map_err(AppError::InvalidRecord)? {
        Value::Object(record) => Ok(record),
        _ => Err(AppError::Validation(
            "os campos devem ser um objeto JSON".to_string(),
        )),
    }
}
