use std::sync::Arc;

use crate::config::AppConfig;
use crate::context::RequestContext;
use crate::metrics::Metrics;
use crate::service::Services;

/// The shared application state.
///
/// Cloned into every handler by axum. Holds only what requests share: the
/// pool, configuration, counters and the wired use cases.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Transaction and fan-out counters, exposed at `/metrics`.
    pub metrics: Metrics,
    pub services: Services,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let metrics = Metrics::new();
        let services = Services::new(db.clone(), &config, metrics.clone());
        Self { db, config: Arc::new(config), metrics, services }
    }

    /// A fresh context for one inbound request, bounded by the configured timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.request_timeout())
    }
}
