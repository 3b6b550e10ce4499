//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_transactions_total` - Total number of transactions appended
//! - `ledger_balance_queries_total` - Total number of balance queries
//! - `ledger_balance_folded_entries` - Histogram of entries folded per balance query
//! - `ledger_history_queries_total` - Total number of history page reads
//! - `ledger_history_length` - Current number of transactions in the log
//!
//! Collectors live in a private registry so several ledgers (tests, embedders)
//! can coexist in one process.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total transactions appended
    pub transactions_total: IntCounter,

    /// Total balance queries
    pub balance_queries_total: IntCounter,

    /// Entries folded per balance query
    pub balance_folded_entries: Histogram,

    /// Total history page reads
    pub history_queries_total: IntCounter,

    /// Current log length
    pub history_length: IntGauge,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let transactions_total = register_int_counter_with_registry!(
            Opts::new("ledger_transactions_total", "Total number of transactions appended"),
            registry
        )?;

        let balance_queries_total = register_int_counter_with_registry!(
            Opts::new("ledger_balance_queries_total", "Total number of balance queries"),
            registry
        )?;

        let balance_folded_entries = register_histogram_with_registry!(
            HistogramOpts::new(
                "ledger_balance_folded_entries",
                "Transactions folded into the cached balance per query"
            )
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]),
            registry
        )?;

        let history_queries_total = register_int_counter_with_registry!(
            Opts::new("ledger_history_queries_total", "Total number of history page reads"),
            registry
        )?;

        let history_length = register_int_gauge_with_registry!(
            Opts::new("ledger_history_length", "Number of transactions in the log"),
            registry
        )?;

        Ok(Self {
            transactions_total,
            balance_queries_total,
            balance_folded_entries,
            history_queries_total,
            history_length,
            registry: Arc::new(registry),
        })
    }

    /// Record an append; `length` is the log length afterwards
    pub fn record_append(&self, length: usize) {
        self.transactions_total.inc();
        self.history_length.set(length as i64);
    }

    /// Record a balance query that folded `folded` new entries
    pub fn record_balance_query(&self, folded: usize) {
        self.balance_queries_total.inc();
        self.balance_folded_entries.observe(folded as f64);
    }

    /// Record a history page read
    pub fn record_history_query(&self) {
        self.history_queries_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every collector in the registry in Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("transactions_total", &self.transactions_total.get())
            .field("history_length", &self.history_length.get())
            .finish_non_exhaustive()
    }
}
