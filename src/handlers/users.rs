// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::user::{CreateUserPayload, CrmUser, UpdateUserPayload},
};

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Usuários",
    responses(
        (status = 200, description = "Usuários do CRM", body = Vec<CrmUser>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<CrmUser>>, AppError> {
    user.require_admin()?;
    Ok(Json(app_state.user_service.list().await?))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Usuários",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = CrmUser),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let created = app_state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/admin/users/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    tag = "Usuários",
    params(("id" = String, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = CrmUser),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<CrmUser>, AppError> {
    user.require_admin()?;
    Ok(Json(app_state.user_service.update(&id, payload).await?))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Usuários",
    params(("id" = String, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;
    if user.id() == id {
        return Err(AppError::Conflict(
            "Você não pode remover o próprio usuário.".to_string(),
        ));
    }
    app_state.user_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
