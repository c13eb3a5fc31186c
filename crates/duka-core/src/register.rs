//! # Register: Inventory Cache + Every Open Cart
//!
//! The register is the single till state shared by all entry points. It owns
//! the cached inventory catalog and all open carts, and it is the ONLY place
//! that mutates cart quantities, so the overselling rule is enforced in one
//! spot:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Register                            │
//! │                                                            │
//! │  items (catalog cache)          carts                      │
//! │  ┌──────────────────┐   ┌─────────────────────────────┐   │
//! │  │ Tomatoes  st=25  │   │ quick    { Tomatoes x 5 }   │   │
//! │  │ Sukuma    st=40  │   │ manual   { Tomatoes x 20 }  │   │
//! │  │ Onions    st=12  │   │ Customer 1 { Sukuma x 3 }   │   │
//! │  └──────────────────┘   │ Customer 2 { }              │   │
//! │                         └─────────────────────────────┘   │
//! │                                                            │
//! │  Every grow/set goes through available_to_reserve() and    │
//! │  is silently clamped, so for every item:                   │
//! │      reserved across ALL carts  <=  cached stock           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantity mutations return the quantity actually applied rather than
//! erroring, so callers can reflect the clamped value without a second
//! query.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::{CartLineView, CartRecord, CartSnapshot, CartSummary};
use crate::money::Money;
use crate::reservation;
use crate::session::{CustomerSession, SessionRegistry};
use crate::types::{EntryPoint, InventoryItem, SaleLine};

/// The shared till: cached catalog plus every open cart.
///
/// ## Concurrency Model
///
/// `Register` itself is single-threaded state. The checkout engine wraps it
/// in a mutex and funnels every mutation through that lock, which is what
/// makes the reserve-then-clamp sequence atomic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Register {
    items: Vec<InventoryItem>,
    quick: CartRecord,
    manual: CartRecord,
    sessions: SessionRegistry,
}

impl Register {
    /// Creates an empty register with no catalog and no open carts.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replaces the cached catalog with a fresh authoritative copy.
    ///
    /// ## Behavior
    ///
    /// The refreshed stock and availability always win, even when they
    /// disagree with an earlier optimistic decrement. Open carts are left
    /// untouched; if a refresh drops stock below what carts already hold,
    /// the next growth attempt simply clamps to zero growth.
    pub fn replace_inventory(&mut self, items: Vec<InventoryItem>) {
        debug!(count = items.len(), "inventory cache replaced");
        self.items = items;
    }

    /// All cached catalog items, in catalog order.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Looks up a single catalog item by id.
    pub fn item(&self, item_id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    // =========================================================================
    // Reservations
    // =========================================================================

    /// Total quantity of an item reserved across the quick cart, the manual
    /// cart, and every customer session cart.
    pub fn reserved_total(&self, item_id: &str) -> i64 {
        let carts = [&self.quick, &self.manual]
            .into_iter()
            .chain(self.sessions.carts());
        reservation::reserved_total(carts, item_id)
    }

    /// How much of an item one cart may still take, not counting the
    /// `excluding` quantity that cart already holds.
    ///
    /// Unknown items have no stock to give and always report 0.
    pub fn available_to_reserve(&self, item_id: &str, excluding: i64) -> i64 {
        match self.item(item_id) {
            Some(item) => {
                reservation::available_to_reserve(item.stock, self.reserved_total(item_id), excluding)
            }
            None => 0,
        }
    }

    /// Headroom left for a cart that holds none of the item yet.
    ///
    /// This is the figure shown next to catalog entries so the operator can
    /// see what all open carts together have left.
    pub fn remaining_stock(&self, item_id: &str) -> i64 {
        self.available_to_reserve(item_id, 0)
    }

    // =========================================================================
    // Cart Access
    // =========================================================================

    /// The cart behind an entry point.
    ///
    /// Quick and manual carts always exist; a session cart exists only while
    /// its session is open.
    pub fn cart(&self, entry: &EntryPoint) -> Option<&CartRecord> {
        match entry {
            EntryPoint::Quick => Some(&self.quick),
            EntryPoint::Manual => Some(&self.manual),
            EntryPoint::Session(id) => self.sessions.cart(id),
        }
    }

    fn cart_mut(&mut self, entry: &EntryPoint) -> Option<&mut CartRecord> {
        match entry {
            EntryPoint::Quick => Some(&mut self.quick),
            EntryPoint::Manual => Some(&mut self.manual),
            EntryPoint::Session(id) => self.sessions.cart_mut(id),
        }
    }

    // =========================================================================
    // Cart Mutations (all clamped)
    // =========================================================================

    /// One tap on a catalog tile: grow the quick cart's line by 1.
    pub fn quick_add(&mut self, item_id: &str) -> i64 {
        self.add_or_increment(&EntryPoint::Quick, item_id, 1)
    }

    /// Grows a cart line by `desired`, clamped to availability.
    ///
    /// ## Behavior
    ///
    /// - Unknown item, out-of-stock item, or non-positive `desired`: no-op
    /// - New lines are priced at the catalog price; existing lines keep
    ///   whatever unit price they already carry
    /// - Growth only: if availability leaves no room above the current
    ///   quantity the line is left exactly as it was, never shrunk
    ///
    /// ## Returns
    ///
    /// The line quantity after the call (0 when no line exists).
    pub fn add_or_increment(&mut self, entry: &EntryPoint, item_id: &str, desired: i64) -> i64 {
        let current = self
            .cart(entry)
            .map(|cart| cart.quantity_of(item_id))
            .unwrap_or(0);

        let (catalog_price, stock) = match self.item(item_id) {
            Some(item) => (item.price(), item.stock),
            None => {
                debug!(item_id, "add ignored, item not in catalog");
                return current;
            }
        };
        if stock <= 0 || desired <= 0 {
            return current;
        }

        let available = self.available_to_reserve(item_id, current);
        let next = (current + desired).min(available);
        if next <= current {
            debug!(item_id, current, desired, available, "add clamped to zero growth");
            return current;
        }

        let unit_price = self
            .cart(entry)
            .and_then(|cart| cart.line(item_id))
            .map(|line| line.unit_price())
            .unwrap_or(catalog_price);

        match self.cart_mut(entry) {
            Some(cart) => {
                cart.upsert(item_id, next, unit_price);
                if next < current + desired {
                    debug!(item_id, desired, applied = next - current, "add clamped to availability");
                }
                next
            }
            None => current,
        }
    }

    /// Sets a line to an exact quantity, clamped to availability.
    ///
    /// The line's own current quantity does not count against it, so typing
    /// the number already on the line is never rejected. Clamping to 0, or
    /// asking for 0, removes the line. Lines for items that have dropped out
    /// of the catalog are removed on the next edit.
    ///
    /// ## Returns
    ///
    /// The line quantity after the call.
    pub fn set_quantity(&mut self, entry: &EntryPoint, item_id: &str, desired: i64) -> i64 {
        let current = match self.cart(entry).and_then(|cart| cart.line(item_id)) {
            Some(line) => line.quantity,
            None => return 0,
        };

        let target = desired.max(0);
        let available = self.available_to_reserve(item_id, current);
        let next = target.min(available);

        if next != target {
            debug!(item_id, target, applied = next, "quantity clamped to availability");
        }

        if let Some(cart) = self.cart_mut(entry) {
            if next <= 0 {
                cart.remove(item_id);
                return 0;
            }
            let unit_price = match cart.line(item_id) {
                Some(line) => line.unit_price(),
                None => return 0,
            };
            cart.upsert(item_id, next, unit_price);
            next
        } else {
            0
        }
    }

    /// Overrides a line's unit price. Non-positive prices are rejected and
    /// the previous price stays.
    pub fn set_unit_price(&mut self, entry: &EntryPoint, item_id: &str, price: Money) -> bool {
        match self.cart_mut(entry) {
            Some(cart) => cart.set_unit_price(item_id, price),
            None => false,
        }
    }

    /// Removes a line outright, freeing its reservation.
    pub fn remove_line(&mut self, entry: &EntryPoint, item_id: &str) -> bool {
        match self.cart_mut(entry) {
            Some(cart) => cart.remove(item_id),
            None => false,
        }
    }

    // =========================================================================
    // Display Projections
    // =========================================================================

    /// A display summary of one cart, with lines joined against the catalog.
    ///
    /// Lines whose item has dropped out of the catalog are omitted from the
    /// summary (and from its total) until an edit removes them.
    pub fn summary(&self, entry: &EntryPoint) -> CartSummary {
        let cart = match self.cart(entry) {
            Some(cart) => cart,
            None => return CartSummary::empty(),
        };

        let mut lines = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let item = match self.item(&line.item_id) {
                Some(item) => item,
                None => continue,
            };
            lines.push(CartLineView {
                item_id: line.item_id.clone(),
                name: item.name.clone(),
                unit: item.unit,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents(),
                stock: item.stock,
            });
        }

        let total_cents = lines.iter().map(|line| line.line_total_cents).sum();
        let item_count = lines.iter().map(|line| line.quantity).sum();
        CartSummary {
            lines,
            total_cents,
            item_count,
        }
    }

    // =========================================================================
    // Sale Completion
    // =========================================================================

    /// Expands a frozen checkout snapshot into receipt lines.
    ///
    /// Stock figures are read from the catalog cache at call time, so calling
    /// this at the moment a sale is accepted records the before/after pair the
    /// receipt shows. Snapshot lines for items no longer in the catalog are
    /// skipped.
    pub fn build_sale_lines(&self, snapshot: &CartSnapshot) -> Vec<SaleLine> {
        let mut lines = Vec::with_capacity(snapshot.lines.len());
        for line in &snapshot.lines {
            let item = match self.item(&line.item_id) {
                Some(item) => item,
                None => continue,
            };
            let stock_before = item.stock;
            lines.push(SaleLine {
                item_id: line.item_id.clone(),
                name: item.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents(),
                stock_before,
                stock_after: (stock_before - line.quantity).max(0),
            });
        }
        lines
    }

    /// The label a receipt carries for a given entry point.
    pub fn sale_label(&self, entry: &EntryPoint) -> String {
        match entry {
            EntryPoint::Quick => "Quick Sale".to_string(),
            EntryPoint::Manual => "Manual Sale".to_string(),
            EntryPoint::Session(id) => self
                .sessions
                .get(id)
                .map(|session| session.label.clone())
                .unwrap_or_else(|| "Customer".to_string()),
        }
    }

    /// Applies an accepted sale to the till.
    ///
    /// ## Behavior
    ///
    /// - Cached stock is decremented optimistically per snapshot line,
    ///   floored at 0, and items that hit 0 are marked unavailable
    /// - The quick or manual cart is cleared; a session entry point has its
    ///   whole session closed (the registry picks the fallback active
    ///   session)
    ///
    /// The decrement is an estimate to keep the catalog honest until the
    /// post-sale refresh lands; the refreshed catalog then overwrites it.
    pub fn apply_committed_sale(&mut self, entry: &EntryPoint, snapshot: &CartSnapshot) {
        for line in &snapshot.lines {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == line.item_id) {
                item.stock = (item.stock - line.quantity).max(0);
                item.available = item.stock > 0;
            }
        }

        match entry {
            EntryPoint::Quick => self.quick.clear(),
            EntryPoint::Manual => self.manual.clear(),
            EntryPoint::Session(id) => {
                self.sessions.close(id);
            }
        }
        debug!(entry = %entry, lines = snapshot.lines.len(), "committed sale applied to till");
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Opens a new customer session and makes it active.
    pub fn create_session(&mut self) -> &CustomerSession {
        self.sessions.create()
    }

    /// Closes a session, discarding its cart and freeing its reservations.
    pub fn close_session(&mut self, session_id: &str) -> bool {
        self.sessions.close(session_id)
    }

    /// Switches which session is active. Unknown ids are ignored.
    pub fn set_active_session(&mut self, session_id: &str) -> bool {
        self.sessions.set_active(session_id)
    }

    /// Read access to the session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

// =============================================================================
// Tests
// =============================================================================
