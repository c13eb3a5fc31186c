//! # Customer Sessions
//!
//! Any number of customers can have a cart open at the till at once (one
//! is being served while others are still picking). Each gets a
//! [`CustomerSession`] with its own cart; all session carts reserve stock
//! exactly like the quick and manual carts do.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create() ──► "Customer 3" (label = 1 + highest suffix in use)         │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │            cart edits, reservations count immediately                   │
//! │                    │                                                    │
//! │        ┌───────────┴───────────┐                                        │
//! │        ▼                       ▼                                        │
//! │  close(id)               successful commit                              │
//! │  cart discarded,         session closed by the engine,                  │
//! │  reservations freed      cart went into the sale                        │
//! │                                                                         │
//! │  Closing the ACTIVE session falls back to the oldest remaining one.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Active" only selects which session the operator is editing. It has no
//! effect on reservations; every open session reserves regardless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartRecord;

// =============================================================================
// Customer Session
// =============================================================================

/// One customer's open cart at the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human label shown on the session tab ("Customer 3").
    pub label: String,

    /// When the session was opened.
    pub created_at: DateTime<Utc>,

    /// The session's cart.
    pub cart: CartRecord,
}

// =============================================================================
// Session Registry
// =============================================================================

/// Creates, tracks, and closes customer sessions.
///
/// Sessions are kept in creation order; the active-session fallback after
/// a close is the oldest remaining session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRegistry {
    sessions: Vec<CustomerSession>,
    active_id: Option<String>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        SessionRegistry {
            sessions: Vec::new(),
            active_id: None,
        }
    }

    /// Opens a new session with an empty cart and makes it active.
    ///
    /// ## Label Allocation
    /// "Customer N" where N is 1 + the highest numeric suffix among open
    /// sessions, not a running counter. With "Customer 1" and "Customer 3"
    /// open, the next is "Customer 4"; after closing "Customer 3", the
    /// next is "Customer 2" again. Labels never collide with one still on
    /// screen.
    pub fn create(&mut self) -> &CustomerSession {
        let label = format!("Customer {}", self.next_label_number());
        let session = CustomerSession {
            id: Uuid::new_v4().to_string(),
            label,
            created_at: Utc::now(),
            cart: CartRecord::new(),
        };
        self.active_id = Some(session.id.clone());
        self.sessions.push(session);
        // Just pushed, so last() is the new session
        self.sessions.last().unwrap()
    }

    /// Closes a session, discarding its cart (reservations freed).
    ///
    /// If the closed session was active, activation falls back to the
    /// oldest remaining session, or to none.
    ///
    /// ## Returns
    /// `true` if a session was actually removed.
    pub fn close(&mut self, id: &str) -> bool {
        let initial_len = self.sessions.len();
        self.sessions.retain(|session| session.id != id);
        if self.sessions.len() == initial_len {
            return false;
        }

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }
        true
    }

    /// Changes which session is highlighted for editing.
    ///
    /// ## Returns
    /// `false` if the id is unknown (activation unchanged).
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.sessions.iter().any(|session| session.id == id) {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Returns the active session id, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Returns the active session, if any.
    pub fn active(&self) -> Option<&CustomerSession> {
        let id = self.active_id.as_deref()?;
        self.get(id)
    }

    /// Looks up a session by id.
    pub fn get(&self, id: &str) -> Option<&CustomerSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    /// Looks up a session's cart by id.
    pub fn cart(&self, id: &str) -> Option<&CartRecord> {
        self.get(id).map(|session| &session.cart)
    }

    /// Looks up a session's cart mutably by id.
    pub fn cart_mut(&mut self, id: &str) -> Option<&mut CartRecord> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .map(|session| &mut session.cart)
    }

    /// Iterates sessions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomerSession> {
        self.sessions.iter()
    }

    /// Iterates all session carts (for reservation totals).
    pub fn carts(&self) -> impl Iterator<Item = &CartRecord> {
        self.sessions.iter().map(|session| &session.cart)
    }

    /// Returns the number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Checks if no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Computes the next label number: 1 + highest suffix in use.
    fn next_label_number(&self) -> u32 {
        let highest = self
            .sessions
            .iter()
            .filter_map(|session| session.label.strip_prefix("Customer "))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        highest + 1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_create_assigns_sequential_labels() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.create().label, "Customer 1");
        assert_eq!(registry.create().label, "Customer 2");
        assert_eq!(registry.create().label, "Customer 3");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_create_becomes_active() {
        let mut registry = SessionRegistry::new();
        let first = registry.create().id.clone();
        assert_eq!(registry.active_id(), Some(first.as_str()));

        let second = registry.create().id.clone();
        assert_eq!(registry.active_id(), Some(second.as_str()));
    }

    #[test]
    fn test_labels_skip_past_highest_in_use() {
        let mut registry = SessionRegistry::new();
        let first = registry.create().id.clone(); // Customer 1
        registry.create(); // Customer 2
        registry.create(); // Customer 3

        // Close the middle one: highest in use is still 3
        let second_id = registry.iter().nth(1).unwrap().id.clone();
        registry.close(&second_id);
        assert_eq!(registry.create().label, "Customer 4");

        // Close everything but Customer 1: next is 2 again
        let ids: Vec<String> = registry
            .iter()
            .filter(|s| s.id != first)
            .map(|s| s.id.clone())
            .collect();
        for id in ids {
            registry.close(&id);
        }
        assert_eq!(registry.create().label, "Customer 2");
    }

    #[test]
    fn test_close_active_falls_back_to_oldest() {
        let mut registry = SessionRegistry::new();
        let first = registry.create().id.clone();
        registry.create();
        let third = registry.create().id.clone();

        assert_eq!(registry.active_id(), Some(third.as_str()));
        assert!(registry.close(&third));
        assert_eq!(registry.active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_close_non_active_keeps_activation() {
        let mut registry = SessionRegistry::new();
        let first = registry.create().id.clone();
        let second = registry.create().id.clone();

        registry.set_active(&second);
        assert!(registry.close(&first));
        assert_eq!(registry.active_id(), Some(second.as_str()));
    }

    #[test]
    fn test_close_last_session_clears_active() {
        let mut registry = SessionRegistry::new();
        let only = registry.create().id.clone();
        assert!(registry.close(&only));
        assert_eq!(registry.active_id(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_unknown_session() {
        let mut registry = SessionRegistry::new();
        registry.create();
        assert!(!registry.close("no-such-id"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_active_unknown_session() {
        let mut registry = SessionRegistry::new();
        let first = registry.create().id.clone();
        assert!(!registry.set_active("no-such-id"));
        assert_eq!(registry.active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_close_discards_cart() {
        let mut registry = SessionRegistry::new();
        let id = registry.create().id.clone();
        registry
            .cart_mut(&id)
            .unwrap()
            .upsert("veg-001", 3, Money::from_cents(8000));

        assert_eq!(registry.cart(&id).unwrap().item_count(), 3);
        registry.close(&id);
        assert!(registry.cart(&id).is_none());
    }
}
