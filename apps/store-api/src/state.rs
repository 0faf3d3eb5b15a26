//! Shared application state.
//!
//! Created once in `main`, cloned into every handler by axum. The pool
//! inside [`Database`] is the only connection state in the process.

use std::sync::Arc;

use store_db::Database;

use crate::config::ApiConfig;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
