// src/handlers/members.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    db::Filter,
    middleware::auth::AuthenticatedUser,
    models::{member::Member, notification::Notification, payment::Payment},
};

// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Portal do Cooperado",
    responses(
        (status = 200, description = "Dados do cooperado autenticado", body = Member),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Member>, AppError> {
    let member = app_state
        .entities
        .members
        .find_by_id(user.id())
        .await?
        .ok_or_else(|| AppError::NotFound("cooperado".to_string()))?;
    Ok(Json(member))
}

// GET /api/me/payments
#[utoipa::path(
    get,
    path = "/api/me/payments",
    tag = "Portal do Cooperado",
    responses(
        (status = 200, description = "Pagamentos do cooperado", body = Vec<Payment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_payments(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Payment>>, AppError> {
    let mut payments = app_state
        .entities
        .payments
        .filter(&Filter::new().eq("cooperado_id", user.id()))
        .await?;
    payments.sort_by(|a, b| b.data_vencimento.cmp(&a.data_vencimento));
    Ok(Json(payments))
}

// GET /api/me/notifications
#[utoipa::path(
    get,
    path = "/api/me/notifications",
    tag = "Portal do Cooperado",
    responses(
        (status = 200, description = "Notificações do cooperado", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_notifications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state.notification_service.list_for(user.id()).await?;
    Ok(Json(notifications))
}

// POST /api/me/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/me/notifications/{id}/read",
    tag = "Portal do Cooperado",
    params(("id" = String, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Notificação marcada como lida", body = Notification),
        (status = 404, description = "Notificação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let notification = app_state
        .notification_service
        .mark_read(user.id(), &id)
        .await?;
    Ok(Json(notification))
}
