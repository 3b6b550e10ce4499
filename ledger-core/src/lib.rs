//! Ledger Core
//!
//! In-memory, append-only transaction ledger for a single account.
//!
//! # Architecture
//!
//! - **Append-only log**: transactions are never modified or reordered
//! - **Dense ids**: the ledger issues ids 1, 2, 3, ... with no gaps
//! - **Incremental balance**: a watermark plus an exact decimal accumulator
//! - **Single lock**: log, id sequence and balance cache change together
//! - **Single writer**: an optional Tokio actor serializes mutations in arrival order
//!
//! # Invariants
//!
//! - `history[i].id == i + 1` for every index
//! - `cached_through < len(history)` whenever it is set
//! - `cached_balance == Σ history[0..=cached_through].amount`, exactly, with no
//!   rounding or overflow however large the sum grows

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod log;
pub mod balance;
pub mod ledger;
pub mod error;
pub mod actor;
pub mod config;
pub mod metrics;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use balance::Balance;
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use types::{ExternalId, LedgerStats, Transaction, TransactionId};
