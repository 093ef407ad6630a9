//! User service: a descriptor-driven CRUD REST backend for the User entity over PostgreSQL.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod mask;
pub mod middleware;
pub mod migration;
pub mod model;
pub mod repository;
pub mod routes;
pub mod search;
pub mod service;
pub mod sql;

pub use app::ApplicationContext;
pub use config::{load_config, AppConfig};
pub use error::{AppError, ConfigError};
pub use routes::router;
