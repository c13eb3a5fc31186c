//! # Backend Seams
//!
//! The engine talks to the outside world through two narrow traits: one that
//! serves the catalog, one that records sales. Production wires these to the
//! shop's service; tests wire them to [`crate::memory::InMemoryBackend`].
//!
//! ```text
//! CheckoutEngine ──► CatalogProvider::list_items ──────► authoritative stock
//!        │
//!        └─────────► SaleCommitService::commit_sale ──► Accepted
//!                                                       Declined(reason)
//!                                                       Err(transport)
//! ```
//!
//! A decline is a normal answer, not an error: the flow moves to the failure
//! stage and the operator decides what happens next. Only transport trouble
//! (service unreachable, malformed reply) comes back as `Err`.

use async_trait::async_trait;

use duka_core::{CartSnapshot, FailureCode, InventoryItem, PaymentMethod};

use crate::error::CheckoutResult;

/// Serves the authoritative item catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches the full catalog with current stock levels.
    async fn list_items(&self) -> CheckoutResult<Vec<InventoryItem>>;
}

/// Records committed sales.
///
/// The engine guarantees at most one in-flight commit per flow and always
/// sends the snapshot frozen when the flow first triggered a commit, so a
/// retry after a decline carries the same lines as the declined attempt.
#[async_trait]
pub trait SaleCommitService: Send + Sync {
    /// Asks the backend to record a sale.
    async fn commit_sale(
        &self,
        snapshot: &CartSnapshot,
        method: PaymentMethod,
    ) -> CheckoutResult<CommitOutcome>;
}

/// The backend's answer to a commit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Sale recorded; the engine applies it to the till.
    Accepted,

    /// Sale refused; the flow moves to the failure stage.
    Declined(DeclineReason),
}

/// Why the backend refused a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// The backend could not record the sale.
    Rejected,

    /// The customer's M-Pesa balance does not cover the total.
    InsufficientFunds,
}

impl DeclineReason {
    /// The failure code shown on the failure screen.
    pub fn failure_code(&self) -> FailureCode {
        match self {
            DeclineReason::Rejected => FailureCode::BackendFailed,
            DeclineReason::InsufficientFunds => FailureCode::InsufficientFunds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decline_reasons_map_to_failure_codes() {
        assert_eq!(
            DeclineReason::Rejected.failure_code(),
            FailureCode::BackendFailed
        );
        assert_eq!(
            DeclineReason::InsufficientFunds.failure_code(),
            FailureCode::InsufficientFunds
        );
    }

    #[test]
    fn test_failure_codes_keep_their_wire_form() {
        assert_eq!(
            DeclineReason::Rejected.failure_code().as_str(),
            "ERR_BACKEND_FAILED"
        );
        assert_eq!(
            DeclineReason::InsufficientFunds.failure_code().as_str(),
            "ERR_INSUFFICIENT_FUNDS"
        );
    }
}
