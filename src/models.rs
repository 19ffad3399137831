pub mod status;
pub use status::ActiveStatus;
pub mod auth;
pub mod dashboard;
pub mod email;
pub mod enrollment;
pub mod member;
pub mod notification;
pub mod payment;
pub mod plan;
pub mod project;
pub mod user;
