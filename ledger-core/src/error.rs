//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// The in-memory operations themselves cannot fail. These variants cover the
/// machinery around them: the actor front, configuration and metrics.
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger cannot serve the request right now (actor mailbox closed, reply dropped).
    /// Callers may retry; no state has been modified.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Whether the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}
