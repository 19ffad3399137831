// src/db/supabase.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::remote::{text_value, Filter, Record, RemoteError, RemoteStore};

/// Corpo de erro padrão do PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Cliente da API REST (PostgREST) do Supabase.
#[derive(Clone)]
pub struct SupabaseStore {
    http: Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    /// `col=eq.valor` para cada predicado; `col=is.null` quando o valor é nulo.
    fn predicates(filter: &Filter) -> Vec<(String, String)> {
        filter
            .predicates()
            .iter()
            .map(|(column, value)| match text_value(value) {
                Some(text) => (column.clone(), format!("eq.{}", text)),
                None => (column.clone(), "is.null".to_string()),
            })
            .collect()
    }

    /// As colunas `id` e `*_id` são uuid; um valor em outro formato não casa com
    /// nenhuma linha, como nos demais backends (o PostgREST responderia 22P02).
    fn matches_nothing(filter: &Filter) -> bool {
        filter.predicates().iter().any(|(column, value)| {
            (column == "id" || column.ends_with("_id"))
                && text_value(value).is_some_and(|text| Uuid::parse_str(&text).is_err())
        })
    }

    async fn rows(response: Response) -> Result<Vec<Record>, RemoteError> {
        let response = Self::check(response).await?;
        let rows: Vec<Record> = response.json().await?;
        Ok(rows)
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();

        if let Some(err) = parsed {
            let message = match (&err.message, &err.details) {
                (Some(m), Some(d)) => format!("{} ({})", m, d),
                (Some(m), None) => m.clone(),
                _ => body.clone(),
            };
            if let Some(code) = err.code.as_deref() {
                if let Some(classified) = RemoteError::from_code(code, message.clone()) {
                    return Err(classified);
                }
            }
            return Err(RemoteError::from_status(status.as_u16(), message));
        }

        Err(RemoteError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        if Self::matches_nothing(filter) {
            return Ok(Vec::new());
        }

        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(Self::predicates(filter));

        let response = self
            .request(reqwest::Method::GET, table)
            .query(&query)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Response {
                status: 201,
                body: format!("inserção em '{}' não devolveu a linha criada", table),
            })
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        if Self::matches_nothing(filter) {
            return Ok(Vec::new());
        }

        let response = self
            .request(reqwest::Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&Self::predicates(filter))
            .json(&fields)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        if Self::matches_nothing(filter) {
            return Ok(Vec::new());
        }

        let response = self
            .request(reqwest::Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(&Self::predicates(filter))
            .send()
            .await?;
        Self::rows(response).await
    }

    /// Uma consulta `select=<coluna>&limit=0` por coluna; o PostgREST responde
    /// 42703 para colunas inexistentes.
    async fn missing_columns(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<String>, RemoteError> {
        let mut missing = Vec::new();
        for column in columns {
            let response = self
                .request(reqwest::Method::GET, table)
                .query(&[("select", column.as_str()), ("limit", "0")])
                .send()
                .await?;

            match Self::check(response).await {
                Ok(_) => {}
                Err(RemoteError::Schema(message)) if message.contains(column.as_str()) => {
                    missing.push(column.clone());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(missing)
    }
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}
