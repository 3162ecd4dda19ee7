use std::sync::Arc;

use fundmate_classifier::provider::Classifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fundmate_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// The configured classifier provider, used by synchronous ingestion.
    pub classifier: Arc<dyn Classifier>,
}
