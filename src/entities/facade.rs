// src/entities/facade.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

use super::adapter::{Entity, EntityAdapter};
use crate::{
    config::{Backend, BackendSettings},
    db::{Base44Store, MemoryStore, PostgresStore, RemoteStore, SupabaseStore},
    models::{
        email::EmailLog,
        enrollment::Enrollment,
        member::{Credential, Member},
        notification::Notification,
        payment::Payment,
        plan::Plan,
        project::Project,
        user::CrmUser,
    },
    schema::{self, TableReport},
};

/// Um adaptador por entidade, cada um já ligado ao backend configurado.
/// O resto da aplicação só conversa com esta estrutura.
#[derive(Clone)]
pub struct Entities {
    pub members: EntityAdapter<Member>,
    pub credentials: EntityAdapter<Credential>,
    pub plans: EntityAdapter<Plan>,
    pub projects: EntityAdapter<Project>,
    pub payments: EntityAdapter<Payment>,
    pub enrollments: EntityAdapter<Enrollment>,
    pub notifications: EntityAdapter<Notification>,
    pub users: EntityAdapter<CrmUser>,
    pub email_logs: EntityAdapter<EmailLog>,
}

impl Entities {
    /// Abre apenas os backends referenciados pela configuração.
    pub async fn connect(settings: &BackendSettings) -> anyhow::Result<Self> {
        let mut stores: HashMap<Backend, Arc<dyn RemoteStore>> = HashMap::new();
        for backend in settings.backends_in_use() {
            let store = open_store(backend, settings).await?;
            tracing::info!("✅ Backend '{}' pronto", backend);
            stores.insert(backend, store);
        }
        Self::from_stores(settings, &stores)
    }

    /// Monta a fachada com clientes já abertos (um por backend).
    pub fn from_stores(
        settings: &BackendSettings,
        stores: &HashMap<Backend, Arc<dyn RemoteStore>>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            members: bind::<Member>(settings, stores)?,
            credentials: bind::<Credential>(settings, stores)?,
            plans: bind::<Plan>(settings, stores)?,
            projects: bind::<Project>(settings, stores)?,
            payments: bind::<Payment>(settings, stores)?,
            enrollments: bind::<Enrollment>(settings, stores)?,
            notifications: bind::<Notification>(settings, stores)?,
            users: bind::<CrmUser>(settings, stores)?,
            email_logs: bind::<EmailLog>(settings, stores)?,
        })
    }

    /// Todas as entidades num único cliente.
    pub fn single(backend: Backend, store: Arc<dyn RemoteStore>) -> Self {
        Self {
            members: EntityAdapter::new(store.clone(), backend),
            credentials: EntityAdapter::new(store.clone(), backend),
            plans: EntityAdapter::new(store.clone(), backend),
            projects: EntityAdapter::new(store.clone(), backend),
            payments: EntityAdapter::new(store.clone(), backend),
            enrollments: EntityAdapter::new(store.clone(), backend),
            notifications: EntityAdapter::new(store.clone(), backend),
            users: EntityAdapter::new(store.clone(), backend),
            email_logs: EntityAdapter::new(store, backend),
        }
    }

    /// Fachada sobre um banco em memória com as restrições de produção.
    pub fn in_memory() -> Self {
        Self::single(Backend::Memory, Arc::new(MemoryStore::with_default_constraints()))
    }

    pub fn adapter<T: Entity>(&self) -> &EntityAdapter<T> {
        T::adapter(self)
    }

    pub async fn verify_schema(&self) -> Vec<TableReport> {
        schema::verify(self).await
    }
}

fn bind<T: Entity>(
    settings: &BackendSettings,
    stores: &HashMap<Backend, Arc<dyn RemoteStore>>,
) -> anyhow::Result<EntityAdapter<T>> {
    let backend = settings.backend_for(T::KIND);
    let store = stores
        .get(&backend)
        .with_context(|| format!("backend '{}' não foi aberto para '{}'", backend, T::KIND))?;
    Ok(EntityAdapter::new(store.clone(), backend))
}

async fn open_store(
    backend: Backend,
    settings: &BackendSettings,
) -> anyhow::Result<Arc<dyn RemoteStore>> {
    let store: Arc<dyn RemoteStore> = match backend {
        Backend::Supabase => {
            let supabase = settings
                .supabase
                .as_ref()
                .context("SUPABASE_URL e SUPABASE_KEY devem ser definidos para o backend supabase")?;
            Arc::new(SupabaseStore::new(&supabase.url, supabase.key.clone())?)
        }
        Backend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL deve ser definida para o backend postgres")?;
            Arc::new(
                PostgresStore::connect(url)
                    .await
                    .context("Falha ao conectar no Postgres")?,
            )
        }
        Backend::Base44 => {
            let base44 = settings
                .base44
                .as_ref()
                .context("BASE44_APP_ID e BASE44_API_KEY devem ser definidos para o backend base44")?;
            Arc::new(Base44Store::new(
                &base44.api_url,
                &base44.app_id,
                base44.api_key.clone(),
            )?)
        }
        Backend::Memory => {
            tracing::warn!("⚠️ Usando banco em memória: os dados somem ao reiniciar");
            Arc::new(MemoryStore::with_default_constraints())
        }
    };
    Ok(store)
}
