//! School Library Reports
//!
//! REST service in front of the school library's loan store: lends and
//! returns books, classifies loans as active, overdue or returned, and
//! serves filterable loan reports with CSV export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod dates;
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
