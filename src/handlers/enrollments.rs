// src/handlers/enrollments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::Filter,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::ResetPasswordPayload,
        enrollment::{
            ApprovalOutcome, Enrollment, EnrollmentPayload, PasswordResetOutcome,
            RejectEnrollmentPayload,
        },
        plan::Plan,
        status::ActiveStatus,
    },
};

// =============================================================================
//  ÁREA PÚBLICA
// =============================================================================

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Inscrições",
    responses(
        (status = 200, description = "Planos ativos", body = Vec<Plan>)
    )
)]
pub async fn list_active_plans(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Plan>>, AppError> {
    let plans = app_state
        .entities
        .plans
        .filter(&Filter::new().eq("status", ActiveStatus::Active))
        .await?;
    Ok(Json(plans))
}

// POST /api/enrollments
#[utoipa::path(
    post,
    path = "/api/enrollments",
    tag = "Inscrições",
    request_body = EnrollmentPayload,
    responses(
        (status = 201, description = "Inscrição recebida", body = Enrollment),
        (status = 400, description = "Dados inválidos ou plano inativo"),
        (status = 409, description = "CPF já pertence a um cooperado")
    )
)]
pub async fn submit_enrollment(
    State(app_state): State<AppState>,
    Json(payload): Json<EnrollmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    // A validação do formulário fica no serviço
    let enrollment = app_state.enrollment_service.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

// =============================================================================
//  ÁREA ADMINISTRATIVA
// =============================================================================

// POST /api/admin/enrollments/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/enrollments/{id}/approve",
    tag = "Inscrições",
    params(("id" = String, Path, description = "ID da inscrição")),
    responses(
        (status = 200, description = "Inscrição aprovada e cooperado criado", body = ApprovalOutcome),
        (status = 404, description = "Inscrição não encontrada"),
        (status = 409, description = "Inscrição não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_enrollment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApprovalOutcome>, AppError> {
    tracing::info!("Aprovando inscrição {} (usuário {})", id, user.id());
    let outcome = app_state.enrollment_service.approve(&id).await?;
    Ok(Json(outcome))
}

// POST /api/admin/enrollments/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/enrollments/{id}/reject",
    tag = "Inscrições",
    params(("id" = String, Path, description = "ID da inscrição")),
    request_body = RejectEnrollmentPayload,
    responses(
        (status = 200, description = "Inscrição rejeitada", body = Enrollment),
        (status = 404, description = "Inscrição não encontrada"),
        (status = 409, description = "Inscrição não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_enrollment(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RejectEnrollmentPayload>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = app_state
        .enrollment_service
        .reject(&id, payload.motivo)
        .await?;
    Ok(Json(enrollment))
}

// POST /api/admin/members/reset-password
#[utoipa::path(
    post,
    path = "/api/admin/members/reset-password",
    tag = "Inscrições",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Nova senha gerada", body = PasswordResetOutcome),
        (status = 404, description = "Nenhuma credencial com este e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_member_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<PasswordResetOutcome>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .enrollment_service
        .reset_member_password(&payload.email)
        .await?;
    Ok(Json(outcome))
}
