//! # Domain Types
//!
//! Core domain types used throughout Duka POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │   PaymentFlow   │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  entry_point    │   │  reference_id   │       │
//! │  │  name, unit     │   │  reference_id   │   │  method, total  │       │
//! │  │  price_cents    │   │  stage, method  │   │  lines[]        │       │
//! │  │  stock          │   │  attempt        │   │  stock before/  │       │
//! │  │  available      │   │  error_code     │   │  after per line │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Unit       │   │  PaymentStage   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Kg             │   │  Method         │   │  Cash           │       │
//! │  │  Pieces         │   │  Processing     │   │  Mpesa          │       │
//! │  └─────────────────┘   │  Success        │   │  Card           │       │
//! │                        │  SaleComplete   │   └─────────────────┘       │
//! │                        │  Failure        │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Points
//! Three kinds of cart contexts compete for the same stock: the one-tap
//! quick cart, the manually-priced cart, and any number of customer
//! sessions. [`EntryPoint`] is the tag that selects one of them; every
//! cart operation is entry-point-scoped so the reservation math stays in
//! one place instead of being duplicated three times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Unit of Measure
// =============================================================================

/// How an inventory item is measured and sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Sold by weight in kilograms.
    Kg,
    /// Sold by count.
    Pieces,
}

impl Unit {
    /// Short label for quantity columns ("3 kg", "5 pieces").
    pub const fn label(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Pieces => "pieces",
        }
    }

    /// Price suffix for catalog rows ("KSh 80.00 per kg").
    pub const fn per_unit_label(&self) -> &'static str {
        match self {
            Unit::Kg => "per kg",
            Unit::Pieces => "per piece",
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Pieces
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A catalog item as cached by the engine.
///
/// The catalog collaborator owns the authoritative copy; this is a read
/// snapshot, refreshed after every committed sale. The only local mutation
/// allowed is the optimistic post-commit stock decrement, which the next
/// refresh overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier from the catalog.
    pub id: String,

    /// Display name shown to the operator.
    pub name: String,

    /// Unit of measure.
    pub unit: Unit,

    /// Price per unit in cents.
    pub price_cents: i64,

    /// On-hand stock in units. Never negative.
    pub stock: i64,

    /// Whether the item can currently be sold.
    /// Cleared locally when optimistic stock reaches zero.
    pub available: bool,
}

impl InventoryItem {
    /// Returns the catalog price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the item has any stock left to sell.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.available && self.stock > 0
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Identifies one of the concurrent cart contexts.
///
/// `Quick` and `Manual` are singletons that always exist; `Session` carts
/// are created and destroyed with their [`crate::session::CustomerSession`].
/// All of them reserve against the same stock pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// The one-tap cart on the catalog grid.
    Quick,
    /// The manually-priced cart (operator types quantity and price).
    Manual,
    /// A customer session cart, keyed by session id.
    Session(String),
}

impl EntryPoint {
    /// Returns the session id for session entry points.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            EntryPoint::Session(id) => Some(id),
            _ => None,
        }
    }

    /// Checks whether this is a session entry point.
    #[inline]
    pub fn is_session(&self) -> bool {
        matches!(self, EntryPoint::Session(_))
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::Quick => write!(f, "quick"),
            EntryPoint::Manual => write!(f, "manual"),
            EntryPoint::Session(id) => write!(f, "session:{}", id),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// M-Pesa mobile money (STK push to the customer's phone).
    Mpesa,
    /// Card payment on an external terminal.
    Card,
}

impl PaymentMethod {
    /// Cash and card confirm instantly at the till; M-Pesa needs the
    /// customer to approve an STK push on their phone first.
    #[inline]
    pub const fn is_instant(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Card)
    }

    /// Display label for receipts and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Mpesa => "M-Pesa",
            PaymentMethod::Card => "Card",
        }
    }
}

// =============================================================================
// Payment Stage
// =============================================================================

/// Stage of the active payment flow.
///
/// ```text
/// method ──► processing ──► success ──► sale_complete
///    │            │            ▲
///    │ (cash/card │ decline/   │ retry (attempt += 1)
///    │  commit)───┤  cancel    │
///    │            ▼            │
///    └─────────► failure ──────┘
///                   │
///                   └──► method (switch to cash) / cancel (flow destroyed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStage {
    /// Choosing a payment method (and entering a phone for M-Pesa).
    Method,
    /// Waiting for asynchronous confirmation (M-Pesa STK push).
    Processing,
    /// Payment confirmed, sale committed; confirmation screen.
    Success,
    /// Terminal acknowledgement after success.
    SaleComplete,
    /// Payment failed; carries an error code, recoverable.
    Failure,
}

impl PaymentStage {
    /// Finished stages. A flow parked here is done business; a new checkout
    /// may silently replace it. Every other stage blocks new checkouts.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, PaymentStage::Success | PaymentStage::SaleComplete)
    }

    /// Lowercase stage name, matching the serialized form.
    pub const fn name(&self) -> &'static str {
        match self {
            PaymentStage::Method => "method",
            PaymentStage::Processing => "processing",
            PaymentStage::Success => "success",
            PaymentStage::SaleComplete => "sale_complete",
            PaymentStage::Failure => "failure",
        }
    }
}

impl fmt::Display for PaymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for PaymentStage {
    fn default() -> Self {
        PaymentStage::Method
    }
}

// =============================================================================
// Failure Codes
// =============================================================================

/// Why a payment attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCode {
    /// The commit service rejected or could not record the sale.
    #[serde(rename = "ERR_BACKEND_FAILED")]
    BackendFailed,
    /// The operator aborted while waiting for customer confirmation.
    #[serde(rename = "ERR_CUSTOMER_CANCELLED")]
    CustomerCancelled,
    /// The customer's M-Pesa balance could not cover the sale.
    #[serde(rename = "ERR_INSUFFICIENT_FUNDS")]
    InsufficientFunds,
}

impl FailureCode {
    /// The wire/display form of the code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FailureCode::BackendFailed => "ERR_BACKEND_FAILED",
            FailureCode::CustomerCancelled => "ERR_CUSTOMER_CANCELLED",
            FailureCode::InsufficientFunds => "ERR_INSUFFICIENT_FUNDS",
        }
    }

    /// Operator-facing explanation for the failure screen.
    pub const fn description(&self) -> &'static str {
        match self {
            FailureCode::BackendFailed => "The sale could not be recorded by the payment service.",
            FailureCode::CustomerCancelled => {
                "Transaction was cancelled before the customer approved it."
            }
            FailureCode::InsufficientFunds => {
                "Customer does not have enough balance in their M-Pesa account."
            }
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Flow
// =============================================================================

/// The single active checkout state machine instance.
///
/// Exactly zero or one of these exists at a time; it is created by
/// `start_checkout`, carried through the stages above, and destroyed on
/// cancel or on `finish_sale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFlow {
    /// Which cart this flow is committing.
    pub entry_point: EntryPoint,

    /// Human-readable transaction reference ("TXN-483920").
    pub reference_id: String,

    /// Current stage.
    pub stage: PaymentStage,

    /// Chosen method, once selected.
    pub method: Option<PaymentMethod>,

    /// Normalized payer phone, once captured (M-Pesa only).
    pub phone_number: Option<String>,

    /// Attempt counter, starting at 1, incremented on retry.
    pub attempt: u32,

    /// Failure code when `stage` is [`PaymentStage::Failure`].
    pub error_code: Option<FailureCode>,
}

impl PaymentFlow {
    /// Creates a fresh flow in the method-selection stage.
    pub fn new(entry_point: EntryPoint, reference_id: String) -> Self {
        PaymentFlow {
            entry_point,
            reference_id,
            stage: PaymentStage::Method,
            method: None,
            phone_number: None,
            attempt: 1,
            error_code: None,
        }
    }
}

// =============================================================================
// Confirmation Steps (M-Pesa)
// =============================================================================

/// Fixed progress labels for the M-Pesa processing screen, in order.
///
/// A timer advances the step counter through 1..=3; once the final step is
/// reached the commit fires after a short delay.
pub const CONFIRMATION_STEPS: [&str; 4] = [
    "STK Push sent successfully",
    "Waiting for customer response",
    "Payment confirmation",
    "Transaction complete",
];

/// Number of timer-driven steps before the commit fires.
pub const FINAL_CONFIRMATION_STEP: u8 = 3;

// =============================================================================
// Sale Record
// =============================================================================

/// A line of a materialized sale.
/// Uses the snapshot pattern: name and price are frozen at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub name: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    /// Cached stock before the sale.
    pub stock_before: i64,
    /// Cached stock after the optimistic decrement (never below zero).
    pub stock_after: i64,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// The materialized result of a successful flow.
///
/// Rendered on the success and sale-complete screens, then replaced by the
/// next sale. Durable persistence belongs to the commit collaborator, not
/// to this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// The flow's transaction reference ("TXN-483920").
    pub reference_id: String,

    /// Which cart produced the sale.
    pub entry_point: EntryPoint,

    /// Receipt label: "Quick Sale", "Manual Sale", or the session's
    /// customer label ("Customer 3").
    pub label: String,

    /// How the customer paid.
    pub method: PaymentMethod,

    /// Sale total in cents.
    pub total_cents: i64,

    /// When the commit was accepted.
    pub completed_at: DateTime<Utc>,

    /// How many attempts the flow took.
    pub attempt: u32,

    /// Sold lines with frozen prices and stock movement.
    pub lines: Vec<SaleLine>,

    /// M-Pesa confirmation code (mobile money only).
    pub mpesa_code: Option<String>,

    /// Payer phone number (mobile money only).
    pub phone_number: Option<String>,
}

impl SaleRecord {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_labels() {
        assert_eq!(Unit::Kg.label(), "kg");
        assert_eq!(Unit::Pieces.per_unit_label(), "per piece");
    }

    #[test]
    fn test_unit_wire_form() {
        assert_eq!(serde_json::to_string(&Unit::Kg).unwrap(), "\"kg\"");
        assert_eq!(serde_json::to_string(&Unit::Pieces).unwrap(), "\"pieces\"");
    }

    #[test]
    fn test_entry_point_display() {
        assert_eq!(EntryPoint::Quick.to_string(), "quick");
        assert_eq!(EntryPoint::Manual.to_string(), "manual");
        assert_eq!(
            EntryPoint::Session("s-1".into()).to_string(),
            "session:s-1"
        );
    }

    #[test]
    fn test_entry_point_session_id() {
        assert_eq!(EntryPoint::Quick.session_id(), None);
        let session = EntryPoint::Session("s-9".into());
        assert_eq!(session.session_id(), Some("s-9"));
        assert!(session.is_session());
    }

    #[test]
    fn test_payment_method_instant() {
        assert!(PaymentMethod::Cash.is_instant());
        assert!(PaymentMethod::Card.is_instant());
        assert!(!PaymentMethod::Mpesa.is_instant());
    }

    #[test]
    fn test_stage_terminal() {
        assert!(!PaymentStage::Method.is_terminal());
        assert!(!PaymentStage::Processing.is_terminal());
        assert!(!PaymentStage::Failure.is_terminal());
        assert!(PaymentStage::Success.is_terminal());
        assert!(PaymentStage::SaleComplete.is_terminal());
    }

    #[test]
    fn test_failure_code_wire_form() {
        assert_eq!(
            serde_json::to_string(&FailureCode::BackendFailed).unwrap(),
            "\"ERR_BACKEND_FAILED\""
        );
        assert_eq!(FailureCode::InsufficientFunds.as_str(), "ERR_INSUFFICIENT_FUNDS");
        assert!(FailureCode::CustomerCancelled
            .description()
            .contains("cancelled"));
    }

    #[test]
    fn test_new_flow_defaults() {
        let flow = PaymentFlow::new(EntryPoint::Quick, "TXN-123456".into());
        assert_eq!(flow.stage, PaymentStage::Method);
        assert_eq!(flow.attempt, 1);
        assert!(flow.method.is_none());
        assert!(flow.error_code.is_none());
    }

    #[test]
    fn test_confirmation_steps_order() {
        assert_eq!(CONFIRMATION_STEPS.len(), 4);
        assert_eq!(CONFIRMATION_STEPS[0], "STK Push sent successfully");
        assert_eq!(CONFIRMATION_STEPS[3], "Transaction complete");
        assert_eq!(FINAL_CONFIRMATION_STEP as usize, CONFIRMATION_STEPS.len() - 1);
    }
}
