// src/services/user_service.rs

use serde_json::{json, Map, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Filter,
    entities::{Entities, Identifier},
    models::{
        status::ActiveStatus,
        user::{CreateUserPayload, CrmUser, NewCrmUser, UpdateUserPayload, UserRole},
    },
    services::auth::{hash_password, normalize_email},
};

#[derive(Clone)]
pub struct UserService {
    entities: Entities,
}

impl UserService {
    pub fn new(entities: Entities) -> Self {
        Self { entities }
    }

    pub async fn list(&self) -> Result<Vec<CrmUser>, AppError> {
        self.entities.users.list().await
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<CrmUser, AppError> {
        payload.validate()?;

        let email = normalize_email(&payload.email);
        if self
            .entities
            .users
            .find_one(&Filter::new().eq("email", email.as_str()))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Este e-mail já está em uso.".to_string()));
        }

        let password_hash = hash_password(&payload.senha).await?;
        let user = self
            .entities
            .users
            .create(&NewCrmUser {
                nome: payload.nome,
                email,
                password_hash,
                perfil: payload.perfil,
                status: ActiveStatus::Active,
            })
            .await?;

        tracing::info!("👤 Usuário do CRM criado: {}", user.id);
        Ok(user)
    }

    pub async fn update(&self, id: &str, payload: UpdateUserPayload) -> Result<CrmUser, AppError> {
        payload.validate()?;

        let mut fields = Map::new();
        if let Some(nome) = payload.nome {
            fields.insert("nome".to_string(), Value::String(nome));
        }
        if let Some(perfil) = payload.perfil {
            fields.insert("perfil".to_string(), json!(perfil));
        }
        if let Some(status) = payload.status {
            fields.insert("status".to_string(), status.into());
        }
        if let Some(senha) = payload.senha {
            fields.insert("password_hash".to_string(), Value::String(hash_password(&senha).await?));
        }

        if fields.is_empty() {
            return Err(AppError::Validation("Nenhum campo para atualizar.".to_string()));
        }

        self.entities.users.update(&Identifier::Id(id.to_string()), &fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.entities.users.delete(id).await?;
        tracing::info!("👤 Usuário do CRM removido: {}", id);
        Ok(())
    }

    /// Cria o primeiro administrador quando ainda não existe nenhum usuário.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<CrmUser>, AppError> {
        if !self.entities.users.list().await?.is_empty() {
            return Ok(None);
        }

        let admin = self
            .create(CreateUserPayload {
                nome: "Administrador".to_string(),
                email: email.to_string(),
                senha: password.to_string(),
                perfil: UserRole::Admin,
            })
            .await?;

        tracing::info!("✅ Administrador inicial criado: {}", admin.email);
        Ok(Some(admin))
    }
}
