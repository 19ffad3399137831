pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod entities;
pub mod members;
pub mod users;
