//! # duka-core: Pure Business Logic for Duka POS
//!
//! This crate is the **heart** of Duka POS. It contains all business logic
//! as pure, synchronous code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Operator UI (external)                     │   │
//! │  │    Catalog grid ──► Cart tabs ──► Payment screens              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               duka-checkout (Async Engine)                      │   │
//! │  │    Flow state machine, timers, commit calls, catalog refresh   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ duka-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────┐    │   │
//! │  │   │  money   │ │   cart   │ │reservation│ │   register   │    │   │
//! │  │   │  Money   │ │CartRecord│ │ headroom  │ │ carts+stock  │    │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────┘    │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐                     │   │
//! │  │   │  types   │ │ session  │ │validation │                     │   │
//! │  │   │ domain   │ │ registry │ │  phones   │                     │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘                     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NO TIMERS • PURE STATE TRANSITIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, PaymentFlow, SaleRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart records, snapshots, and display summaries
//! - [`reservation`] - Reserved totals and available-to-reserve headroom
//! - [`register`] - The till: inventory cache + all carts + clamped mutations
//! - [`session`] - Customer session registry
//! - [`validation`] - Phone normalization, quantity and price input rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure State**: Every operation is a synchronous state transition;
//!    the same calls in the same order always produce the same till
//! 2. **No I/O**: Database, network, file system, timers are FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors
//! 4. **Stock Is Never Oversold**: Every quantity-increasing mutation is
//!    clamped against availability computed across ALL open carts
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::register::Register;
//! use duka_core::types::{EntryPoint, InventoryItem, Unit};
//!
//! let mut register = Register::new();
//! register.replace_inventory(vec![InventoryItem {
//!     id: "veg-001".into(),
//!     name: "Tomatoes".into(),
//!     unit: Unit::Kg,
//!     price_cents: 8000,
//!     stock: 25,
//!     available: true,
//! }]);
//!
//! // Quick cart takes 5 kg, manual cart asks for 25 and is clamped to 20
//! register.add_or_increment(&EntryPoint::Quick, "veg-001", 5);
//! let applied = register.add_or_increment(&EntryPoint::Manual, "veg-001", 25);
//! assert_eq!(applied, 20);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod register;
pub mod reservation;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use duka_core::Money` instead of
// `use duka_core::money::Money`

pub use cart::{CartLine, CartLineView, CartRecord, CartSnapshot, CartSummary};
pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use register::Register;
pub use session::{CustomerSession, SessionRegistry};
pub use types::*;
