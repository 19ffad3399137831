// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{member_guard, staff_guard},
    models::{
        enrollment::Enrollment, member::Member, notification::Notification, payment::Payment,
        plan::Plan, project::Project,
    },
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas (site e formulário de inscrição)
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/members/login", post(handlers::auth::member_login))
        .route("/enrollments", post(handlers::enrollments::submit_enrollment))
        .route("/plans", get(handlers::enrollments::list_active_plans));

    // Portal do cooperado
    let member_routes = Router::new()
        .route("/", get(handlers::members::get_me))
        .route("/payments", get(handlers::members::my_payments))
        .route("/notifications", get(handlers::members::my_notifications))
        .route(
            "/notifications/{id}/read",
            post(handlers::members::mark_notification_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            member_guard,
        ));

    // Painel administrativo (admin e operador)
    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .route(
            "/enrollments/{id}/approve",
            post(handlers::enrollments::approve_enrollment),
        )
        .route(
            "/enrollments/{id}/reject",
            post(handlers::enrollments::reject_enrollment),
        )
        .route(
            "/members/reset-password",
            post(handlers::enrollments::reset_member_password),
        )
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .nest("/members", handlers::entities::routes::<Member>())
        .nest("/plans", handlers::entities::routes::<Plan>())
        .nest("/projects", handlers::entities::routes::<Project>())
        .nest("/payments", handlers::entities::routes::<Payment>())
        .nest("/enrollments", handlers::entities::routes::<Enrollment>())
        .nest("/notifications", handlers::entities::routes::<Notification>())
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            staff_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", public_routes)
        .nest("/api/me", member_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
