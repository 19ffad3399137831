// src/config.rs

use std::{
    collections::{BTreeMap, BTreeSet},
    env, fmt,
    str::FromStr,
    sync::Arc,
};

use anyhow::Context;
use serde::Serialize;

use crate::{
    entities::{Entities, EntityKind},
    services::{
        auth::AuthService,
        dashboard_service::DashboardService,
        email_service::{DisabledEmailSender, EmailJsSender, EmailSender, EmailService},
        enrollment_service::EnrollmentService,
        notification_service::NotificationService,
        user_service::UserService,
    },
};

// =========================================================================
//  BACKENDS DE DADOS
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Supabase,
    Postgres,
    Base44,
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Supabase => "supabase",
            Backend::Postgres => "postgres",
            Backend::Base44 => "base44",
            Backend::Memory => "memory",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Backend::Supabase),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "base44" => Ok(Backend::Base44),
            "memory" | "memoria" => Ok(Backend::Memory),
            other => Err(format!("backend desconhecido: '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
}

#[derive(Clone)]
pub struct Base44Settings {
    pub api_url: String,
    pub app_id: String,
    pub api_key: String,
}

/// Qual backend atende cada entidade, e como chegar em cada um.
#[derive(Clone)]
pub struct BackendSettings {
    pub default: Backend,
    pub overrides: BTreeMap<EntityKind, Backend>,
    pub supabase: Option<SupabaseSettings>,
    pub database_url: Option<String>,
    pub base44: Option<Base44Settings>,
}

impl BackendSettings {
    /// Todas as entidades no mesmo backend, sem credenciais.
    pub fn single(backend: Backend) -> Self {
        Self {
            default: backend,
            overrides: BTreeMap::new(),
            supabase: None,
            database_url: None,
            base44: None,
        }
    }

    pub fn with_override(mut self, kind: EntityKind, backend: Backend) -> Self {
        self.overrides.insert(kind, backend);
        self
    }

    pub fn backend_for(&self, kind: EntityKind) -> Backend {
        self.overrides.get(&kind).copied().unwrap_or(self.default)
    }

    /// Backends que de fato atendem alguma entidade.
    pub fn backends_in_use(&self) -> BTreeSet<Backend> {
        EntityKind::ALL.iter().map(|k| self.backend_for(*k)).collect()
    }
}

/// "notifications=base44, email_logs=supabase"
pub fn parse_overrides(raw: &str) -> anyhow::Result<BTreeMap<EntityKind, Backend>> {
    let mut overrides = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (entity, backend) = pair
            .split_once('=')
            .with_context(|| format!("sobrescrita inválida '{pair}', use entidade=backend"))?;
        let kind: EntityKind = entity.parse().map_err(anyhow::Error::msg)?;
        let backend: Backend = backend.parse().map_err(anyhow::Error::msg)?;
        overrides.insert(kind, backend);
    }
    Ok(overrides)
}

// =========================================================================
//  CONFIGURAÇÃO DO PROCESSO
// =========================================================================

#[derive(Clone)]
pub struct EmailJsSettings {
    pub api_url: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
}

#[derive(Clone)]
pub struct Settings {
    pub backends: BackendSettings,
    pub emailjs: Option<EmailJsSettings>,
    pub jwt_secret: String,
    pub server_addr: String,
    pub admin: Option<(String, String)>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let default = match optional("DATA_BACKEND") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => Backend::Supabase,
        };
        let overrides = match optional("DATA_BACKEND_OVERRIDES") {
            Some(raw) => parse_overrides(&raw).context("DATA_BACKEND_OVERRIDES")?,
            None => BTreeMap::new(),
        };

        let supabase = match (optional("SUPABASE_URL"), optional("SUPABASE_KEY")) {
            (Some(url), Some(key)) => Some(SupabaseSettings { url, key }),
            _ => None,
        };
        let base44 = match (optional("BASE44_APP_ID"), optional("BASE44_API_KEY")) {
            (Some(app_id), Some(api_key)) => Some(Base44Settings {
                api_url: optional("BASE44_API_URL")
                    .unwrap_or_else(|| "https://app.base44.com/api".to_string()),
                app_id,
                api_key,
            }),
            _ => None,
        };

        let emailjs = match (
            optional("EMAILJS_SERVICE_ID"),
            optional("EMAILJS_TEMPLATE_ID"),
            optional("EMAILJS_PUBLIC_KEY"),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Some(EmailJsSettings {
                api_url: optional("EMAILJS_API_URL")
                    .unwrap_or_else(|| "https://api.emailjs.com".to_string()),
                service_id,
                template_id,
                public_key,
                private_key: optional("EMAILJS_PRIVATE_KEY"),
            }),
            _ => None,
        };

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            backends: BackendSettings {
                default,
                overrides,
                supabase,
                database_url: optional("DATABASE_URL"),
                base44,
            },
            emailjs,
            jwt_secret,
            server_addr: optional("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            admin: optional("ADMIN_EMAIL").zip(optional("ADMIN_PASSWORD")),
        })
    }
}

// Variável ausente ou vazia conta como não definida
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// =========================================================================
//  ESTADO COMPARTILHADO
// =========================================================================

#[derive(Clone)]
pub struct AppState {
    pub entities: Entities,
    pub auth_service: AuthService,
    pub enrollment_service: EnrollmentService,
    pub user_service: UserService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let entities = Entities::connect(&settings.backends).await?;

        let sender: Arc<dyn EmailSender> = match &settings.emailjs {
            Some(emailjs) => Arc::new(EmailJsSender::new(emailjs.clone())?),
            None => {
                tracing::warn!("⚠️ EmailJS não configurado: e-mails não serão enviados");
                Arc::new(DisabledEmailSender)
            }
        };

        let state = Self::from_parts(entities, sender, settings.jwt_secret.clone());

        if let Some((email, password)) = &settings.admin {
            state
                .user_service
                .bootstrap_admin(email, password)
                .await
                .context("Falha ao criar o administrador inicial")?;
        }

        Ok(state)
    }

    /// Monta o gráfico de dependências a partir de uma fachada já construída.
    pub fn from_parts(entities: Entities, sender: Arc<dyn EmailSender>, jwt_secret: String) -> Self {
        let email_service = EmailService::new(entities.clone(), sender);
        let auth_service = AuthService::new(entities.clone(), jwt_secret);

        Self {
            enrollment_service: EnrollmentService::new(entities.clone(), email_service),
            user_service: UserService::new(entities.clone()),
            notification_service: NotificationService::new(entities.clone()),
            dashboard_service: DashboardService::new(entities.clone()),
            auth_service,
            entities,
        }
    }
}
