//! Core types for the ledger
//!
//! All types are designed for:
//! - Immutability once created (private fields, read-only accessors)
//! - Exact arithmetic (Decimal for money)
//! - Keeping the internal sequence number apart from the public identifier

use crate::balance::Balance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Internal transaction sequence number.
///
/// Dense, 1-based and assigned by the ledger: the transaction with id `k`
/// always sits at log index `k - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    /// First id ever issued. `0` is never issued.
    pub const FIRST: TransactionId = TransactionId(1);

    /// Create from a raw value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Log index this id maps to
    pub fn index(&self) -> Option<usize> {
        self.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public transaction identifier (random UUIDv4).
///
/// This is what external callers see; it carries no information about
/// the internal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(Uuid);

impl ExternalId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<ExternalId> for Uuid {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed monetary movement recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: TransactionId,
    amount: Decimal,
    external_id: ExternalId,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId, amount: Decimal, external_id: ExternalId) -> Self {
        Self {
            id,
            amount,
            external_id,
        }
    }

    /// Internal sequence number
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Signed amount (positive, negative or zero)
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Public identifier
    pub fn external_id(&self) -> ExternalId {
        self.external_id
    }
}

/// Point-in-time view of the ledger's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Number of transactions in the log
    pub transaction_count: usize,

    /// Id the next append will receive
    pub next_id: TransactionId,

    /// Highest log index folded into the cached balance (`None` = nothing cached)
    pub cached_through: Option<usize>,

    /// Balance of `history[0..=cached_through]`
    pub cached_balance: Balance,
}
