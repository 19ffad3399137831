// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthResponse, LoginUserPayload, MemberLoginPayload},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login do CRM realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_admin(&payload.email, &payload.senha)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// POST /api/members/login
#[utoipa::path(
    post,
    path = "/api/members/login",
    tag = "Auth",
    request_body = MemberLoginPayload,
    responses(
        (status = 200, description = "Login do cooperado realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn member_login(
    State(app_state): State<AppState>,
    Json(payload): Json<MemberLoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_member(&payload.numero_associado, &payload.senha)
        .await?;

    Ok(Json(AuthResponse { token }))
}
