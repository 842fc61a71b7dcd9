pub mod config;
pub mod error;
pub mod forms;
pub mod storage;
pub mod tasks;
pub mod web;

use std::sync::Arc;

use config::AppConfig;
use storage::TaskStore;
use tera::Tera;

/// Shared application state passed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn TaskStore>,
    pub templates: Tera,
    pub started_at: std::time::Instant,
}
