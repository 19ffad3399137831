// src/services/email_service.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::EmailJsSettings,
    entities::Entities,
    models::email::{CredentialsEmail, EmailStatus, NewEmailLog},
};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("envio de e-mail não configurado")]
    NotConfigured,

    #[error("falha de comunicação com o EmailJS: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("EmailJS recusou o envio (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Quem de fato entrega o e-mail.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), EmailError>;
}

// =========================================================================
//  EMAILJS
// =========================================================================

#[derive(Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a CredentialsEmail,
}

pub struct EmailJsSender {
    http: Client,
    settings: EmailJsSettings,
}

impl EmailJsSender {
    pub fn new(settings: EmailJsSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl EmailSender for EmailJsSender {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), EmailError> {
        let body = EmailJsRequest {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            access_token: self.settings.private_key.as_deref(),
            template_params: email,
        };

        let response = self
            .http
            .post(format!(
                "{}/api/v1.0/email/send",
                self.settings.api_url.trim_end_matches('/')
            ))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(EmailError::Rejected { status: status.as_u16(), body })
    }
}

/// Usado quando o EmailJS não está configurado: nada sai, e o chamador fica sabendo.
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), EmailError> {
        tracing::warn!("✉️ E-mail para {} não enviado: EmailJS desativado", email.to_email);
        Err(EmailError::NotConfigured)
    }
}

// =========================================================================
//  SERVIÇO (envio + registro em email_logs)
// =========================================================================

#[derive(Clone)]
pub struct EmailService {
    entities: Entities,
    sender: Arc<dyn EmailSender>,
}

impl EmailService {
    pub fn new(entities: Entities, sender: Arc<dyn EmailSender>) -> Self {
        Self { entities, sender }
    }

    /// Envia e registra o resultado. Falhas nunca sobem: o retorno diz se saiu.
    pub async fn send_credentials(&self, template: &str, email: &CredentialsEmail) -> bool {
        let result = self.sender.send_credentials(email).await;

        let log = match &result {
            Ok(()) => {
                tracing::info!("✉️ E-mail '{}' enviado para {}", template, email.to_email);
                NewEmailLog {
                    destinatario: email.to_email.clone(),
                    template: template.to_string(),
                    status: EmailStatus::Enviado,
                    erro: None,
                }
            }
            Err(e) => {
                tracing::warn!("✉️ Falha ao enviar '{}' para {}: {}", template, email.to_email, e);
                NewEmailLog {
                    destinatario: email.to_email.clone(),
                    template: template.to_string(),
                    status: EmailStatus::Falhou,
                    erro: Some(e.to_string()),
                }
            }
        };

        if let Err(e) = self.entities.email_logs.create(&log).await {
            tracing::warn!("Não foi possível registrar o envio em email_logs: {}", e);
        }

        result.is_ok()
    }
}
