// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;

use crate::{
    common::error::AppError,
    db::Filter,
    entities::{Entities, Identifier},
    models::{
        auth::{Claims, Perfil},
        status::ActiveStatus,
    },
};

// =========================================================================
//  SENHAS
// =========================================================================

/// bcrypt é pesado: roda fora do runtime assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

/// Senha provisória enviada por e-mail na aprovação e na redefinição.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =========================================================================
//  LOGIN E TOKENS
// =========================================================================

#[derive(Clone)]
pub struct AuthService {
    entities: Entities,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(entities: Entities, jwt_secret: String) -> Self {
        Self { entities, jwt_secret }
    }

    /// Login de usuário do CRM (admin/operador).
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<String, AppError> {
        let criteria = Filter::new()
            .eq("email", normalize_email(email))
            .eq("status", ActiveStatus::Active);

        let user = self
            .entities
            .users
            .find_unique(&criteria)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.entities
            .users
            .update(&Identifier::Id(user.id.clone()), &json!({ "ultimo_acesso": Utc::now() }))
            .await?;

        tracing::info!("🔑 Login do usuário do CRM {}", user.id);
        self.create_token(&user.id, user.perfil.into())
    }

    /// Login do cooperado: número de associado + senha da credencial.
    pub async fn login_member(
        &self,
        numero_associado: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let member_criteria = Filter::new()
            .eq("numero_associado", numero_associado.trim().to_uppercase())
            .eq("status", ActiveStatus::Active);

        let member = self
            .entities
            .members
            .find_unique(&member_criteria)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Nunca mais de uma credencial por cooperado: find_unique falha se houver.
        let credential = self
            .entities
            .credentials
            .find_unique(&Filter::new().eq("cooperado_id", member.id.as_str()))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if credential.status != ActiveStatus::Active {
            return Err(AppError::InvalidCredentials);
        }

        if !verify_password(password, &credential.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.entities
            .credentials
            .update(
                &Identifier::Id(credential.id.clone()),
                &json!({ "ultimo_acesso": Utc::now() }),
            )
            .await?;

        tracing::info!("🔑 Login do cooperado {}", member.numero_associado);
        self.create_token(&member.id, Perfil::Cooperado)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub fn create_token(&self, subject: &str, perfil: Perfil) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: subject.to_string(),
            perfil,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_with_perfil() {
        let service = AuthService::new(Entities::in_memory(), "segredo".into());
        let token = service.create_token("abc", Perfil::Operador).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.perfil, Perfil::Operador);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let issuer = AuthService::new(Entities::in_memory(), "um".into());
        let verifier = AuthService::new(Entities::in_memory(), "outro".into());
        let token = issuer.create_token("abc", Perfil::Admin).unwrap();

        assert!(matches!(verifier.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn generated_passwords_are_alphanumeric() {
        let password = generate_password();
        assert_eq!(password.len(), 10);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(password, generate_password());
    }
}
