//! # Reservation Calculator
//!
//! Pure reservation math: how much of an item is promised to open carts,
//! and how much is left to promise.
//!
//! ## The Shared-Stock Problem
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tomatoes: stock = 25                                                   │
//! │                                                                         │
//! │  Quick cart      5 ┐                                                    │
//! │  Manual cart    20 ├── reserved_total = 28 ?? NEVER ALLOWED            │
//! │  Customer 1      3 ┘                                                    │
//! │                                                                         │
//! │  Every quantity-increasing mutation asks this module first:            │
//! │    available_to_reserve = max(stock - reserved + own_line, 0)          │
//! │  and clamps to it. The invariant after every mutation:                 │
//! │    reserved_total(item) <= item.stock                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Recompute Every Time
//! Totals are summed freshly from the live carts on every call instead of
//! being cached. Carts appear and vanish (sessions open and close), and a
//! stale cached total is exactly the bug that oversells stock.

use crate::cart::CartRecord;

// =============================================================================
// Reservation Totals
// =============================================================================

/// Sums the reserved quantity for an item across all open carts.
///
/// O(number of open carts); each cart lookup is a map access.
///
/// ## Example
/// ```rust
/// use duka_core::cart::CartRecord;
/// use duka_core::money::Money;
/// use duka_core::reservation::reserved_total;
///
/// let mut quick = CartRecord::new();
/// quick.upsert("veg-001", 5, Money::from_cents(8000));
/// let mut manual = CartRecord::new();
/// manual.upsert("veg-001", 20, Money::from_cents(8000));
///
/// let carts = [&quick, &manual];
/// assert_eq!(reserved_total(carts.iter().copied(), "veg-001"), 25);
/// ```
pub fn reserved_total<'a, I>(carts: I, item_id: &str) -> i64
where
    I: IntoIterator<Item = &'a CartRecord>,
{
    carts
        .into_iter()
        .map(|cart| cart.quantity_of(item_id))
        .sum()
}

/// Computes how much of an item may still be reserved.
///
/// `excluding` is the calling cart line's own current quantity: a line
/// being edited subtracts its own reservation first, so growing an existing
/// line is judged against true remaining headroom rather than a headroom
/// that already counts the line itself.
///
/// Never negative: over-reserved states (which clamping prevents from
/// arising) would report 0, not a negative ceiling.
#[inline]
pub fn available_to_reserve(stock: i64, reserved: i64, excluding: i64) -> i64 {
    (stock - reserved + excluding).max(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn cart_with(item_id: &str, quantity: i64) -> CartRecord {
        let mut cart = CartRecord::new();
        cart.upsert(item_id, quantity, Money::from_cents(8000));
        cart
    }

    #[test]
    fn test_reserved_total_sums_across_carts() {
        let quick = cart_with("veg-001", 5);
        let manual = cart_with("veg-001", 20);
        let session = cart_with("veg-002", 4);

        let carts = [&quick, &manual, &session];
        assert_eq!(reserved_total(carts.iter().copied(), "veg-001"), 25);
        assert_eq!(reserved_total(carts.iter().copied(), "veg-002"), 4);
        assert_eq!(reserved_total(carts.iter().copied(), "veg-404"), 0);
    }

    #[test]
    fn test_reserved_total_no_carts() {
        let carts: [&CartRecord; 0] = [];
        assert_eq!(reserved_total(carts, "veg-001"), 0);
    }

    #[test]
    fn test_available_basic() {
        // stock 25, others hold 5, fresh line
        assert_eq!(available_to_reserve(25, 5, 0), 20);
    }

    #[test]
    fn test_available_excludes_own_line() {
        // stock 25, total reserved 25 of which this line holds 20:
        // the line may grow back up to 20, not to 0
        assert_eq!(available_to_reserve(25, 25, 20), 20);
    }

    #[test]
    fn test_available_floors_at_zero() {
        // stock 25, reserved 28 elsewhere would go negative
        assert_eq!(available_to_reserve(25, 28, 0), 0);
    }

    #[test]
    fn test_available_out_of_stock() {
        assert_eq!(available_to_reserve(0, 0, 0), 0);
    }
}
