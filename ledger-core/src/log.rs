//! Append-only transaction log with sequential id allocation
//!
//! The log is the only place ids are issued. `history[i].id() == i + 1`
//! holds for every entry because allocation and push happen in the same
//! `&mut self` call.

use crate::types::{ExternalId, Transaction, TransactionId};
use rust_decimal::Decimal;

/// Ordered, append-only sequence of transactions
#[derive(Debug)]
pub struct TransactionLog {
    history: Vec<Transaction>,
    next_id: TransactionId,
}

impl TransactionLog {
    /// Create empty log
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            next_id: TransactionId::FIRST,
        }
    }

    /// Append a transaction for `amount` and return a copy of it
    pub fn append(&mut self, amount: Decimal) -> Transaction {
        let id = self.next_id;
        debug_assert_eq!(id.index(), Some(self.history.len()));

        let transaction = Transaction::new(id, amount, ExternalId::generate());
        self.history.push(transaction.clone());
        self.next_id = id.next();

        transaction
    }

    /// Contiguous page starting at `offset` with at most `limit` entries.
    ///
    /// Offsets at or past the end yield an empty slice.
    pub fn page(&self, offset: usize, limit: usize) -> &[Transaction] {
        if offset >= self.history.len() {
            return &[];
        }
        let end = offset.saturating_add(limit).min(self.history.len());
        &self.history[offset..end]
    }

    /// Entries from `index` to the end
    pub fn since(&self, index: usize) -> &[Transaction] {
        self.history.get(index..).unwrap_or(&[])
    }

    /// Look up by internal id
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        id.index().and_then(|i| self.history.get(i))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing was appended yet
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Id the next append will receive
    pub fn next_id(&self) -> TransactionId {
        self.next_id
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}
