// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::member_login,

        // --- Inscrições ---
        handlers::enrollments::list_active_plans,
        handlers::enrollments::submit_enrollment,
        handlers::enrollments::approve_enrollment,
        handlers::enrollments::reject_enrollment,
        handlers::enrollments::reset_member_password,

        // --- Portal do Cooperado ---
        handlers::members::get_me,
        handlers::members::my_payments,
        handlers::members::my_notifications,
        handlers::members::mark_notification_read,

        // --- Usuários ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Perfil,
            models::auth::LoginUserPayload,
            models::auth::MemberLoginPayload,
            models::auth::ResetPasswordPayload,
            models::auth::AuthResponse,

            // --- Cadastros ---
            models::status::ActiveStatus,
            models::member::Member,
            models::member::Credential,
            models::plan::Plan,
            models::project::ProjectStatus,
            models::project::Project,
            models::payment::PaymentKind,
            models::payment::PaymentStatus,
            models::payment::Payment,
            models::notification::Notification,
            models::email::EmailStatus,
            models::email::EmailLog,

            // --- Inscrições ---
            models::enrollment::EnrollmentStatus,
            models::enrollment::Enrollment,
            models::enrollment::EnrollmentPayload,
            models::enrollment::RejectEnrollmentPayload,
            models::enrollment::ApprovalOutcome,
            models::enrollment::PasswordResetOutcome,

            // --- Usuários ---
            models::user::UserRole,
            models::user::CrmUser,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login do CRM e do cooperado"),
        (name = "Inscrições", description = "Formulário público, aprovação e rejeição"),
        (name = "Portal do Cooperado", description = "Dados, pagamentos e notificações do cooperado"),
        (name = "Usuários", description = "Usuários administrativos do CRM"),
        (name = "Dashboard", description = "Indicadores do painel administrativo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
