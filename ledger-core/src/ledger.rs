//! The ledger aggregate
//!
//! Owns the transaction log, the id sequence and the balance cache as one
//! unit of shared state behind a single `RwLock`.
//!
//! # Locking discipline
//!
//! - `add_transaction` takes the write lock for allocate-and-append, so no
//!   reader ever sees an id that is allocated but not yet in the log.
//! - `get_balance` takes an upgradable read lock. When the cache is already
//!   current it returns immediately; otherwise it upgrades and folds the tail.
//!   Only one upgradable guard exists at a time, so two callers can never fold
//!   the same tail twice.
//! - `get_transaction_history` takes a shared read lock and always observes a
//!   fully appended prefix.
//!
//! Ids follow lock-acquisition order. Callers that need arrival order use
//! [`crate::actor::LedgerHandle`], which serializes appends through a FIFO
//! mailbox.
//!
//! # Example
//!
//! ```
//! use ledger_core::Ledger;
//! use rust_decimal::Decimal;
//!
//! let ledger = Ledger::new();
//! ledger.add_transaction(Decimal::new(10050, 2));
//! ledger.add_transaction(Decimal::new(-5025, 2));
//!
//! assert_eq!(ledger.get_balance(), Decimal::new(5025, 2));
//! assert_eq!(ledger.get_transaction_history(0, 10).len(), 2);
//! ```

use crate::{
    balance::{Balance, BalanceCache},
    log::TransactionLog,
    metrics::Metrics,
    types::{LedgerStats, Transaction},
};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rust_decimal::Decimal;

#[derive(Debug, Default)]
struct LedgerBook {
    log: TransactionLog,
    balance: BalanceCache,
}

/// Single-account, in-memory, append-only ledger
#[derive(Debug, Default)]
pub struct Ledger {
    book: RwLock<LedgerBook>,
    metrics: Option<Metrics>,
}

impl Ledger {
    /// Create empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty ledger that reports to `metrics`
    pub fn with_metrics(metrics: Metrics) -> Self {
        Self {
            book: RwLock::default(),
            metrics: Some(metrics),
        }
    }

    /// Append a transaction for `amount`.
    ///
    /// Accepts any decimal, including zero and negative values.
    pub fn add_transaction(&self, amount: Decimal) -> Transaction {
        let transaction = {
            let mut book = self.book.write();
            let transaction = book.log.append(amount);

            // Under the lock so the gauge never goes backwards
            if let Some(metrics) = &self.metrics {
                metrics.record_append(book.log.len());
            }
            transaction
        };

        tracing::debug!(
            id = %transaction.id(),
            external_id = %transaction.external_id(),
            amount = %transaction.amount(),
            "Transaction appended"
        );

        transaction
    }

    /// Exact sum of every amount in the log.
    ///
    /// Folds only the transactions appended since the previous call.
    pub fn get_balance(&self) -> Balance {
        let book = self.book.upgradable_read();

        let (balance, folded) = if book.balance.is_current(&book.log) {
            (book.balance.total(), 0)
        } else {
            let mut book = RwLockUpgradableReadGuard::upgrade(book);
            let LedgerBook { log, balance } = &mut *book;
            let folded = balance.refresh(log);

            tracing::debug!(
                folded,
                cached_through = ?balance.watermark(),
                "Balance cache refreshed"
            );

            (balance.total(), folded)
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_balance_query(folded);
        }

        balance
    }

    /// Page of the history starting at `offset` with at most `limit` entries,
    /// in creation order. Empty when `offset` is past the end.
    pub fn get_transaction_history(&self, offset: usize, limit: usize) -> Vec<Transaction> {
        let page = self.book.read().log.page(offset, limit).to_vec();

        tracing::debug!(offset, limit, returned = page.len(), "History page read");

        if let Some(metrics) = &self.metrics {
            metrics.record_history_query();
        }

        page
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.book.read().log.len()
    }

    /// Whether no transaction was added yet
    pub fn is_empty(&self) -> bool {
        self.book.read().log.is_empty()
    }

    /// Snapshot of log length, id sequence and cache watermark
    pub fn stats(&self) -> LedgerStats {
        let book = self.book.read();
        LedgerStats {
            transaction_count: book.log.len(),
            next_id: book.log.next_id(),
            cached_through: book.balance.watermark(),
            cached_balance: book.balance.total(),
        }
    }

    /// Attached metrics, if any
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }
}
