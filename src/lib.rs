//! Shelfdesk Library Management Server
//!
//! REST JSON API for per-library book inventories, reader borrow requests
//! and the issue registry that tracks loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services on top of a database pool
    pub fn new(config: AppConfig, pool: sqlx::PgPool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.auth.clone(), config.loans.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
