pub mod auth;
pub mod dashboard_service;
pub mod email_service;
pub mod enrollment_service;
pub mod notification_service;
pub mod user_service;
