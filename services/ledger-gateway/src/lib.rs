// Ledger Gateway - HTTP/JSON boundary for the single-account ledger
// Validates requests, renders domain objects, and talks to the ledger actor

pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod routes;

use ledger_core::{spawn_ledger_actor, Ledger, LedgerHandle, Metrics};
use std::sync::Arc;

pub use config::Config;
pub use errors::{ApiError, ApiResult};
pub use routes::build_router;

#[derive(Clone, Debug)]
pub struct AppState {
    pub ledger: LedgerHandle,
    pub metrics: Metrics,
    pub http_metrics: metrics::HttpMetrics,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the metrics registry, the ledger and its actor.
    ///
    /// Must run inside a Tokio runtime since the actor task is spawned here.
    pub fn new(config: Config) -> prometheus::Result<Self> {
        let metrics = Metrics::new()?;
        let http_metrics = metrics::HttpMetrics::new(metrics.registry())?;

        let ledger = Arc::new(Ledger::with_metrics(metrics.clone()));
        let handle = spawn_ledger_actor(ledger, config.ledger.actor.mailbox_capacity);

        Ok(Self {
            ledger: handle,
            metrics,
            http_metrics,
            config: Arc::new(config),
        })
    }
}
