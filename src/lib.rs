pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod entities;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

pub use config::{AppState, Backend, BackendSettings, Settings};
pub use entities::Entities;
pub use routes::build_router;
