//! Shelfmark
//!
//! REST JSON API for a small library catalog (authors, books, libraries and
//! their librarians) and a blog with tagged posts, guarded by a static
//! role-based access policy.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod policy;
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
