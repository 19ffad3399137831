// src/db/remote.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Uma linha vinda (ou indo) para o banco remoto, já em JSON.
pub type Record = Map<String, Value>;

// =========================================================================
//  ERROS DO CLIENTE REMOTO
// =========================================================================

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Escrita rejeitada pelo banco: {0}")]
    Rejected(String),

    #[error("Violação de unicidade: {0}")]
    Conflict(String),

    #[error("Permissão negada pelo banco: {0}")]
    Permission(String),

    #[error("Esquema incompatível: {0}")]
    Schema(String),

    #[error("Registro não encontrado no backend: {0}")]
    NotFound(String),

    #[error("Operação não suportada por este backend: {0}")]
    Unsupported(String),

    #[error("Falha de comunicação: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Resposta inesperada (HTTP {status}): {body}")]
    Response { status: u16, body: String },

    #[error("Erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),
}

impl RemoteError {
    /// Classifica um código SQLSTATE (ou código PGRST do PostgREST).
    /// Retorna `None` quando o código não tem uma categoria própria.
    pub fn from_code(code: &str, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        match code {
            // check, foreign key, not null, tipo inválido, texto longo demais
            "23514" | "23503" | "23502" | "22P02" | "22001" | "23P01" => {
                Some(RemoteError::Rejected(message))
            }
            "23505" => Some(RemoteError::Conflict(message)),
            "42501" => Some(RemoteError::Permission(message)),
            "42P01" | "42703" | "PGRST200" | "PGRST204" | "PGRST205" => {
                Some(RemoteError::Schema(message))
            }
            _ => None,
        }
    }

    /// Classifica uma falha HTTP pelo status quando o corpo não traz código.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 | 422 => RemoteError::Rejected(body),
            401 | 403 => RemoteError::Permission(body),
            404 => RemoteError::NotFound(body),
            409 => RemoteError::Conflict(body),
            _ => RemoteError::Response { status, body },
        }
    }
}

// =========================================================================
//  FILTRO (conjunção de igualdades)
// =========================================================================

/// Predicados de igualdade combinados com AND: `WHERE col = val AND ...`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    /// Adiciona `column = value`. Repetir a coluna substitui o valor anterior.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.predicates.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.predicates.push((column, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[(String, Value)] {
        &self.predicates
    }

    pub fn to_record(&self) -> Record {
        self.predicates.iter().cloned().collect()
    }

    pub fn from_record(record: Record) -> Self {
        Self {
            predicates: record.into_iter().collect(),
        }
    }

    /// Monta um filtro a partir de pares textuais (ex.: query string).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().fold(Self::new(), |f, (k, v)| {
            let column: String = k.into();
            f.eq(column, Value::String(v.into()))
        })
    }

    /// Avaliação local, com a mesma semântica textual do PostgREST (`eq.`).
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|(column, expected)| {
            let actual = record.get(column).and_then(text_value);
            actual == text_value(expected)
        })
    }
}

/// Representação textual de um valor JSON, como o Postgres faz com `->>`.
/// `null` vira `None`.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Nomes de tabela/coluna aceitos em SQL dinâmico.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

// =========================================================================
//  O CONTRATO DO CLIENTE REMOTO
// =========================================================================

/// Acesso a um banco remoto por nome de tabela + filtro + verbo CRUD.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError>;

    /// Insere uma linha e devolve a linha criada (com id e timestamps do servidor).
    async fn insert(&self, table: &str, record: Record) -> Result<Record, RemoteError>;

    /// Atualiza as linhas que casam com o filtro e devolve as linhas atualizadas.
    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError>;

    /// Remove as linhas que casam com o filtro e devolve as linhas removidas.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError>;

    /// Quais das colunas informadas não existem na tabela.
    async fn missing_columns(
        &self,
        table: &str,
        _columns: &[String],
    ) -> Result<Vec<String>, RemoteError> {
        Err(RemoteError::Unsupported(format!(
            "verificação de esquema da tabela '{}'",
            table
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_matches_textually() {
        let row = record(json!({"id": "1", "lida": false, "valor": 150.5, "obs": null}));

        assert!(Filter::new().eq("lida", "false").matches(&row));
        assert!(Filter::new().eq("lida", false).matches(&row));
        assert!(Filter::new().eq("valor", "150.5").matches(&row));
        assert!(Filter::new().eq("obs", Value::Null).matches(&row));
        assert!(Filter::new().eq("ausente", Value::Null).matches(&row));
        assert!(!Filter::new().eq("id", "1").eq("lida", true).matches(&row));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(&record(json!({"id": "x"}))));
    }

    #[test]
    fn repeated_column_replaces_value() {
        let f = Filter::new().eq("status", "ativo").eq("status", "inativo");
        assert_eq!(f.predicates().len(), 1);
        assert_eq!(f.predicates()[0].1, json!("inativo"));
    }

    #[test]
    fn classifies_postgres_codes() {
        assert!(matches!(RemoteError::from_code("23514", "x"), Some(RemoteError::Rejected(_))));
        assert!(matches!(RemoteError::from_code("23505", "x"), Some(RemoteError::Conflict(_))));
        assert!(matches!(RemoteError::from_code("42703", "x"), Some(RemoteError::Schema(_))));
        assert!(RemoteError::from_code("XX000", "x").is_none());
    }

    #[test]
    fn identifiers_are_restricted() {
        assert!(is_valid_identifier("cooperado_auth"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier("Planos"));
        assert!(!is_valid_identifier("planos; drop table x"));
        assert!(!is_valid_identifier(""));
    }
}
