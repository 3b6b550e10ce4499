//! Actor-based front for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task applies every mutation, in mailbox arrival order
//! - Async message passing with backpressure (bounded mailbox)
//! - History pages are read straight from the shared [`Ledger`] through its
//!   read lock, without a mailbox round trip
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                HTTP handlers (axum)                   │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │   writes ──► mailbox        reads ──► Arc<Ledger>     │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │   add_transaction / get_balance on Arc<Ledger>        │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::balance::Balance;
use crate::types::{LedgerStats, Transaction};
use crate::{Error, Ledger, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Append a new transaction
    AddTransaction {
        /// Amount to record
        amount: Decimal,
        /// Receives the stored transaction
        response: oneshot::Sender<Transaction>,
    },

    /// Compute the balance (refreshes the cache)
    GetBalance {
        /// Receives the current balance
        response: oneshot::Sender<Balance>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
#[derive(Debug)]
pub struct LedgerActor {
    /// Shared ledger
    ledger: Arc<Ledger>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Arc<Ledger>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { ledger, mailbox }
    }

    /// Run the actor event loop until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        tracing::debug!("Ledger actor started");

        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::AddTransaction { amount, response } => {
                    let transaction = self.ledger.add_transaction(amount);
                    if response.send(transaction).is_err() {
                        tracing::warn!("Caller went away before append was acknowledged");
                    }
                }

                LedgerMessage::GetBalance { response } => {
                    if response.send(self.ledger.get_balance()).is_err() {
                        tracing::warn!("Caller went away before balance was delivered");
                    }
                }

                LedgerMessage::Shutdown => {
                    tracing::info!("Ledger actor shutting down");
                    break;
                }
            }
        }

        tracing::debug!("Ledger actor stopped");
    }
}

/// Handle for talking to the actor
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
    ledger: Arc<Ledger>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>, ledger: Arc<Ledger>) -> Self {
        Self { sender, ledger }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Unavailable("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Unavailable("Response channel closed".to_string()))
    }

    /// Append a transaction
    pub async fn add_transaction(&self, amount: Decimal) -> Result<Transaction> {
        self.request(|response| LedgerMessage::AddTransaction { amount, response })
            .await
    }

    /// Get current balance
    pub async fn get_balance(&self) -> Result<Balance> {
        self.request(|response| LedgerMessage::GetBalance { response })
            .await
    }

    /// Get a page of history.
    ///
    /// Served from the shared ledger's read lock. Fails only when the actor is
    /// gone, so callers see the same availability as for writes.
    pub async fn get_transaction_history(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Transaction>> {
        self.ensure_running()?;
        Ok(self.ledger.get_transaction_history(offset, limit))
    }

    /// Bookkeeping snapshot
    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    /// Whether the actor still accepts messages
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(Error::Unavailable("Actor mailbox closed".to_string()))
        }
    }

    /// Shutdown actor. Messages already queued are processed first.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Unavailable("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: Arc<Ledger>, mailbox_capacity: usize) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1)); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger.clone(), rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx, ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::time::{sleep, Duration};

    fn spawn_test_actor() -> LedgerHandle {
        spawn_ledger_actor(Arc::new(Ledger::new()), 16)
    }

    async fn wait_until_stopped(handle: &LedgerHandle) {
        for _ in 0..100 {
            if !handle.is_running() {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
        panic!("actor did not stop");
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = spawn_test_actor();
        assert!(handle.is_running());

        handle.shutdown().await.unwrap();
        wait_until_stopped(&handle).await;
    }

    #[tokio::test]
    async fn test_actor_add_transaction() {
        let handle = spawn_test_actor();

        let tx = handle.add_transaction(dec!(100.50)).await.unwrap();
        assert_eq!(tx.id().value(), 1);
        assert_eq!(tx.amount(), dec!(100.50));

        let history = handle.get_transaction_history(0, 10).await.unwrap();
        assert_eq!(history, vec![tx]);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_balance() {
        let handle = spawn_test_actor();

        handle.add_transaction(dec!(100.50)).await.unwrap();
        handle.add_transaction(dec!(-50.25)).await.unwrap();

        assert_eq!(handle.get_balance().await.unwrap(), dec!(50.25));
        assert_eq!(handle.stats().cached_through, Some(1));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_queued_messages_processed_before_shutdown() {
        let handle = spawn_test_actor();

        let pending: Vec<_> = (0..5)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.add_transaction(Decimal::from(i)).await })
            })
            .collect();
        for task in pending {
            task.await.unwrap().unwrap();
        }
        handle.shutdown().await.unwrap();
        wait_until_stopped(&handle).await;

        assert_eq!(handle.stats().transaction_count, 5);
    }

    #[tokio::test]
    async fn test_actor_survives_abandoned_balance_request() {
        let ledger = Arc::new(Ledger::new());
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(LedgerActor::new(ledger.clone(), rx).run());
        let handle = LedgerHandle::new(tx.clone(), ledger);

        let (response, abandoned) = oneshot::channel();
        drop(abandoned);
        tx.send(LedgerMessage::GetBalance { response }).await.unwrap();

        let added = handle.add_transaction(dec!(7)).await.unwrap();
        assert_eq!(added.id().value(), 1);
        assert_eq!(handle.get_balance().await.unwrap(), dec!(7));
        assert!(handle.is_running());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_balance_past_decimal_max() {
        let handle = spawn_test_actor();
        handle.add_transaction(Decimal::MAX).await.unwrap();
        handle.add_transaction(Decimal::MAX).await.unwrap();

        let balance = handle.get_balance().await.unwrap();
        assert_eq!(balance.to_string(), "158456325028528675187087900670");

        // Still serving after the overflow-sized sum
        assert!(handle.is_running());
        handle.add_transaction(dec!(1)).await.unwrap();
        assert_eq!(handle.stats().transaction_count, 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_requests_after_shutdown_are_unavailable() {
        let handle = spawn_test_actor();
        handle.add_transaction(dec!(1)).await.unwrap();
        handle.shutdown().await.unwrap();
        wait_until_stopped(&handle).await;

        let err = handle.add_transaction(dec!(2)).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(handle.get_balance().await.unwrap_err().is_retryable());
        assert!(handle.get_transaction_history(0, 10).await.is_err());

        // Nothing was appended by the rejected call
        assert_eq!(handle.stats().transaction_count, 1);
    }
}
