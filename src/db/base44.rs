// src/db/base44.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::remote::{text_value, Filter, Record, RemoteError, RemoteStore};

/// Cliente da API de entidades do Base44 (o backend legado).
///
/// A API só endereça registros por id; atualizações e remoções por filtro
/// primeiro resolvem os ids com uma listagem.
#[derive(Clone)]
pub struct Base44Store {
    http: Client,
    entities_url: String,
    api_key: String,
}

impl Base44Store {
    pub fn new(api_url: &str, app_id: &str, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            entities_url: format!("{}/apps/{}/entities", api_url.trim_end_matches('/'), app_id),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.entities_url, path))
            .header("api_key", &self.api_key)
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_status(status.as_u16(), body))
    }

    fn record_id(record: &Record) -> Result<String, RemoteError> {
        record
            .get("id")
            .and_then(text_value)
            .ok_or_else(|| RemoteError::Response {
                status: 200,
                body: "registro do Base44 sem campo 'id'".to_string(),
            })
    }
}

#[async_trait]
impl RemoteStore for Base44Store {
    async fn select(&self, entity: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        // Nulos não têm representação na query string; o filtro local cobre.
        let query: Vec<(String, String)> = filter
            .predicates()
            .iter()
            .filter_map(|(column, value)| text_value(value).map(|v| (column.clone(), v)))
            .collect();

        let response = self
            .request(reqwest::Method::GET, entity)
            .query(&query)
            .send()
            .await?;
        let rows: Vec<Record> = Self::check(response).await?.json().await?;

        Ok(rows.into_iter().filter(|r| filter.matches(r)).collect())
    }

    async fn insert(&self, entity: &str, record: Record) -> Result<Record, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, entity)
            .json(&record)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update(
        &self,
        entity: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        let targets = self.select(entity, filter).await?;

        let mut updated = Vec::with_capacity(targets.len());
        for target in targets {
            let id = Self::record_id(&target)?;
            let response = self
                .request(reqwest::Method::PUT, &format!("{}/{}", entity, id))
                .json(&fields)
                .send()
                .await?;
            updated.push(Self::check(response).await?.json().await?);
        }
        Ok(updated)
    }

    async fn delete(&self, entity: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        let targets = self.select(entity, filter).await?;

        for target in &targets {
            let id = Self::record_id(target)?;
            let response = self
                .request(reqwest::Method::DELETE, &format!("{}/{}", entity, id))
                .send()
                .await?;
            Self::check(response).await?;
        }
        Ok(targets)
    }
}

impl std::fmt::Debug for Base44Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Base44Store")
            .field("entities_url", &self.entities_url)
            .finish_non_exhaustive()
    }
}
