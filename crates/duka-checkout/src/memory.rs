//! # In-Memory Backend
//!
//! A self-contained backend for tests, demos, and offline development. It
//! keeps a stock ledger, answers catalog fetches from it, and deducts stock
//! when sales commit. Declines, outages, and slow answers are scripted per
//! call:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use duka_checkout::backend::DeclineReason;
//! use duka_checkout::memory::InMemoryBackend;
//!
//! let backend = InMemoryBackend::new(vec![]);
//! backend.push_decline(DeclineReason::InsufficientFunds); // next commit declines
//! backend.fail_next_commit();                             // the one after errors
//! backend.delay_next_commit(Duration::from_millis(400));  // the third stalls first
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use duka_core::{CartLine, CartSnapshot, InventoryItem, PaymentMethod};

use crate::backend::{CatalogProvider, CommitOutcome, DeclineReason, SaleCommitService};
use crate::error::{CheckoutError, CheckoutResult};

/// A sale the backend has recorded, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedSale {
    /// How the customer paid.
    pub method: PaymentMethod,

    /// The exact lines the engine sent.
    pub lines: Vec<CartLine>,

    /// Snapshot total in cents.
    pub total_cents: i64,
}

#[derive(Debug, Default)]
struct BackendInner {
    items: Vec<InventoryItem>,
    declines: VecDeque<DeclineReason>,
    fail_next: bool,
    delay_next: Option<Duration>,
    commits: Vec<CommittedSale>,
}

/// Catalog and commit service backed by a plain in-process ledger.
///
/// Shared via `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<BackendInner>,
}

impl InMemoryBackend {
    /// Creates a backend whose ledger starts with the given items.
    pub fn new(items: Vec<InventoryItem>) -> Self {
        InMemoryBackend {
            inner: Mutex::new(BackendInner {
                items,
                ..BackendInner::default()
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, BackendInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Queues a decline for an upcoming commit. Declines are consumed in
    /// order, one per commit.
    pub fn push_decline(&self, reason: DeclineReason) {
        self.inner().declines.push_back(reason);
    }

    /// Makes the next commit fail at the transport level.
    pub fn fail_next_commit(&self) {
        self.inner().fail_next = true;
    }

    /// Makes the next commit stall for `delay` before answering, so a test
    /// can act while the call is still in flight.
    pub fn delay_next_commit(&self, delay: Duration) {
        self.inner().delay_next = Some(delay);
    }

    /// Overwrites an item's ledger stock, as a delivery or correction would.
    pub fn set_stock(&self, item_id: &str, stock: i64) {
        let mut inner = self.inner();
        if let Some(item) = inner.items.iter_mut().find(|item| item.id == item_id) {
            item.stock = stock;
            item.available = stock > 0;
        }
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Current ledger stock for an item.
    pub fn stock_of(&self, item_id: &str) -> Option<i64> {
        self.inner()
            .items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.stock)
    }

    /// How many sales have been recorded.
    pub fn commit_count(&self) -> usize {
        self.inner().commits.len()
    }

    /// Copies of every recorded sale, oldest first.
    pub fn commits(&self) -> Vec<CommittedSale> {
        self.inner().commits.clone()
    }
}

#[async_trait]
impl CatalogProvider for InMemoryBackend {
    async fn list_items(&self) -> CheckoutResult<Vec<InventoryItem>> {
        Ok(self.inner().items.clone())
    }
}

#[async_trait]
impl SaleCommitService for InMemoryBackend {
    async fn commit_sale(
        &self,
        snapshot: &CartSnapshot,
        method: PaymentMethod,
    ) -> CheckoutResult<CommitOutcome> {
        // The guard cannot be held across the stall
        let delay = self.inner().delay_next.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner();

        if inner.fail_next {
            inner.fail_next = false;
            return Err(CheckoutError::Backend("simulated outage".into()));
        }

        if let Some(reason) = inner.declines.pop_front() {
            return Ok(CommitOutcome::Declined(reason));
        }

        for line in &snapshot.lines {
            if let Some(item) = inner.items.iter_mut().find(|item| item.id == line.item_id) {
                let deducted = line.quantity.min(item.stock);
                item.stock -= deducted;
                item.available = item.stock > 0;
            }
        }
        inner.commits.push(CommittedSale {
            method,
            lines: snapshot.lines.clone(),
            total_cents: snapshot.total_cents,
        });
        Ok(CommitOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use duka_core::{CartRecord, Money, Unit};

    fn tomatoes(stock: i64) -> InventoryItem {
        InventoryItem {
            id: "veg-001".into(),
            name: "Tomatoes".into(),
            unit: Unit::Kg,
            price_cents: 8000,
            stock,
            available: stock > 0,
        }
    }

    fn snapshot_of(quantity: i64) -> CartSnapshot {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", quantity, Money::from_cents(8000));
        cart.snapshot()
    }

    #[tokio::test]
    async fn test_accepted_commit_deducts_stock() {
        let backend = InMemoryBackend::new(vec![tomatoes(25)]);

        let outcome = backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Cash)
            .await
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Accepted);
        assert_eq!(backend.stock_of("veg-001"), Some(20));
        assert_eq!(backend.commit_count(), 1);
        assert_eq!(backend.commits()[0].total_cents, 40_000);
    }

    #[tokio::test]
    async fn test_scripted_decline_leaves_stock_alone() {
        let backend = InMemoryBackend::new(vec![tomatoes(25)]);
        backend.push_decline(DeclineReason::InsufficientFunds);

        let outcome = backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Mpesa)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Declined(DeclineReason::InsufficientFunds)
        );
        assert_eq!(backend.stock_of("veg-001"), Some(25));
        assert_eq!(backend.commit_count(), 0);

        // Decline consumed; the next commit goes through
        let outcome = backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Mpesa)
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_fail_next_commit_errors_once() {
        let backend = InMemoryBackend::new(vec![tomatoes(25)]);
        backend.fail_next_commit();

        assert!(backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Cash)
            .await
            .is_err());
        assert!(backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Cash)
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_commit_stalls_then_answers() {
        let backend = Arc::new(InMemoryBackend::new(vec![tomatoes(25)]));
        backend.delay_next_commit(Duration::from_millis(3_000));

        let committing = {
            let backend = backend.clone();
            tokio::spawn(async move {
                backend
                    .commit_sale(&snapshot_of(5), PaymentMethod::Mpesa)
                    .await
            })
        };

        // Still stalled: nothing recorded until the clock moves
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.commit_count(), 0);

        tokio::time::advance(Duration::from_millis(3_000)).await;
        let outcome = committing.await.unwrap().unwrap();
        assert_eq!(outcome, CommitOutcome::Accepted);
        assert_eq!(backend.stock_of("veg-001"), Some(20));
        assert_eq!(backend.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_deduction_floors_at_zero() {
        let backend = InMemoryBackend::new(vec![tomatoes(3)]);

        backend
            .commit_sale(&snapshot_of(5), PaymentMethod::Cash)
            .await
            .unwrap();

        assert_eq!(backend.stock_of("veg-001"), Some(0));
    }

    #[tokio::test]
    async fn test_list_items_serves_the_ledger() {
        let backend = InMemoryBackend::new(vec![tomatoes(25)]);
        backend.set_stock("veg-001", 7);

        let items = backend.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stock, 7);
    }
}
