//! # Cart Records
//!
//! Cart data structures: one [`CartRecord`] per entry point, each mapping
//! item id → line.
//!
//! ## Where Clamping Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutation Layers                                 │
//! │                                                                         │
//! │  Operator Action           Register (register.rs)    CartRecord (here)  │
//! │  ───────────────           ──────────────────────    ─────────────────  │
//! │                                                                         │
//! │  Tap item ───────────────► clamp vs availability ──► upsert(id, qty)   │
//! │                                                                         │
//! │  Edit quantity ──────────► clamp vs availability ──► upsert(id, qty)   │
//! │                                                                         │
//! │  Edit price ─────────────► reject ≤ 0 ────────────► set_unit_price()   │
//! │                                                                         │
//! │  Remove line ────────────► (no gate) ─────────────► remove(id)         │
//! │                                                                         │
//! │  CartRecord itself knows nothing about stock. It only enforces the     │
//! │  local line invariants: quantity > 0, price > 0. Cross-cart stock      │
//! │  ceilings live in the register where every cart is visible.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::Unit;

// =============================================================================
// Cart Line
// =============================================================================

/// One line of a cart.
///
/// ## Design Notes
/// - `unit_price_cents` is frozen at add time from the catalog, then
///   independently editable (per-sale discounts and markups)
/// - `quantity` is always a whole number of units; lines with zero
///   quantity do not exist, they are removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Item id this line reserves.
    pub item_id: String,

    /// Units reserved. Always > 0.
    pub quantity: i64,

    /// Price per unit in cents for this sale.
    pub unit_price_cents: i64,
}

impl CartLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Cart Record
// =============================================================================

/// One entry point's cart: a mapping of item id → line.
///
/// ## Invariants
/// - Lines are unique by item id (the map key)
/// - Every stored line has quantity > 0 (upserting 0 removes)
/// - Every stored line has unit price > 0 (non-positive edits ignored)
///
/// A `BTreeMap` keeps iteration order deterministic so summaries and
/// snapshots render stably regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartRecord {
    lines: BTreeMap<String, CartLine>,
}

impl CartRecord {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        CartRecord {
            lines: BTreeMap::new(),
        }
    }

    /// Returns the line for an item, if present.
    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.get(item_id)
    }

    /// Returns the reserved quantity for an item (0 if absent).
    pub fn quantity_of(&self, item_id: &str) -> i64 {
        self.lines.get(item_id).map_or(0, |line| line.quantity)
    }

    /// Stores a line, replacing any existing one for the same item.
    ///
    /// ## Behavior
    /// - `quantity <= 0` removes the line instead (a zero line is not a
    ///   line)
    /// - Otherwise the line is inserted or overwritten with the given
    ///   quantity and price
    pub fn upsert(&mut self, item_id: &str, quantity: i64, unit_price: Money) {
        if quantity <= 0 {
            self.lines.remove(item_id);
            return;
        }
        self.lines.insert(
            item_id.to_string(),
            CartLine {
                item_id: item_id.to_string(),
                quantity,
                unit_price_cents: unit_price.cents(),
            },
        );
    }

    /// Changes the unit price of an existing line.
    ///
    /// ## Behavior
    /// - Non-positive prices are ignored, the previous price stays
    ///   (forgiving data entry, mirrors how the quantity path clamps)
    /// - Missing lines are ignored
    ///
    /// ## Returns
    /// `true` if the price was applied.
    pub fn set_unit_price(&mut self, item_id: &str, price: Money) -> bool {
        if !price.is_positive() {
            return false;
        }
        match self.lines.get_mut(item_id) {
            Some(line) => {
                line.unit_price_cents = price.cents();
                true
            }
            None => false,
        }
    }

    /// Removes a line unconditionally.
    ///
    /// ## Returns
    /// `true` if a line was actually removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        self.lines.remove(item_id).is_some()
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Iterates lines in item-id order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Returns the total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Calculates the cart total in cents.
    pub fn total_cents(&self) -> i64 {
        self.lines.values().map(|line| line.line_total_cents()).sum()
    }

    /// Freezes the current lines into a snapshot.
    ///
    /// The snapshot, not the live record, is what a commit works from, so
    /// concurrent edits elsewhere cannot corrupt an in-flight sale.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.values().cloned().collect(),
            total_cents: self.total_cents(),
        }
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// An immutable copy of a cart's lines at one instant.
///
/// Captured when a commit is first triggered and reused unchanged on
/// retries, so every attempt of one flow sells exactly the same goods at
/// the same prices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Frozen lines, in item-id order.
    pub lines: Vec<CartLine>,

    /// Frozen total in cents.
    pub total_cents: i64,
}

impl CartSnapshot {
    /// Returns the snapshot total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Checks if the snapshot has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Cart Views
// =============================================================================

/// One cart line enriched with catalog data for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub item_id: String,

    /// Item name from the current catalog snapshot.
    pub name: String,

    /// Unit of measure for quantity labels.
    pub unit: Unit,

    pub quantity: i64,

    pub unit_price_cents: i64,

    pub line_total_cents: i64,

    /// On-hand stock from the catalog cache, for the stock hint next to
    /// the quantity field. Reservations in other carts do not show here;
    /// the add and set paths enforce that ceiling.
    pub stock: i64,
}

/// A cart rendered for display: lines, total, total quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    pub total_cents: i64,
    pub item_count: i64,
}

impl CartSummary {
    /// An empty summary, for entry points with no cart lines.
    pub fn empty() -> Self {
        CartSummary {
            lines: Vec::new(),
            total_cents: 0,
            item_count: 0,
        }
    }

    /// Returns the summary total as Money.
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

    fn price(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_upsert_adds_line() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("veg-001"), 2);
        assert_eq!(cart.total_cents(), 16000);
    }

    #[test]
    fn test_upsert_replaces_line() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));
        cart.upsert("veg-001", 5, price(8000));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("veg-001"), 5);
    }

    #[test]
    fn test_upsert_zero_removes_line() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));
        cart.upsert("veg-001", 0, price(8000));

        assert!(cart.is_empty());
        assert_eq!(cart.quantity_of("veg-001"), 0);
    }

    #[test]
    fn test_set_unit_price() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));

        assert!(cart.set_unit_price("veg-001", price(7500)));
        assert_eq!(cart.line("veg-001").unwrap().unit_price_cents, 7500);
    }

    #[test]
    fn test_set_unit_price_rejects_non_positive() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));

        assert!(!cart.set_unit_price("veg-001", price(0)));
        assert!(!cart.set_unit_price("veg-001", price(-100)));
        // Previous price survives the bad edits
        assert_eq!(cart.line("veg-001").unwrap().unit_price_cents, 8000);
    }

    #[test]
    fn test_set_unit_price_missing_line() {
        let mut cart = CartRecord::new();
        assert!(!cart.set_unit_price("veg-404", price(100)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));

        assert!(cart.remove("veg-001"));
        assert!(!cart.remove("veg-001"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000)); // 160.00
        cart.upsert("veg-002", 3, price(4000)); // 120.00

        assert_eq!(cart.total_cents(), 28000);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_snapshot_is_frozen_and_ordered() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-002", 3, price(4000));
        cart.upsert("veg-001", 2, price(8000));

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.lines.len(), 2);
        // BTreeMap order, not insertion order
        assert_eq!(snapshot.lines[0].item_id, "veg-001");
        assert_eq!(snapshot.lines[1].item_id, "veg-002");
        assert_eq!(snapshot.total_cents, 28000);
        assert_eq!(snapshot.item_count(), 5);

        // Later edits do not leak into the snapshot
        cart.upsert("veg-001", 9, price(100));
        assert_eq!(snapshot.lines[0].quantity, 2);
        assert_eq!(snapshot.lines[0].unit_price_cents, 8000);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartRecord::new();
        cart.upsert("veg-001", 2, price(8000));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
    }
}
