//! Session cart store. Carts are ephemeral, keyed by an opaque session
//! token, and never touch the database: every mutation loads the cart,
//! rewrites it and saves it back as a whole unit, so readers always see a
//! consistent snapshot. Idle carts expire after 30 minutes, pruned lazily
//! on access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use contracts::domain::a002_event::aggregate::EventId;
use contracts::shared::cart::{CartItem, CartView};
use once_cell::sync::Lazy;

use crate::shared::error::AppError;

const CART_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

static STORE: Lazy<CartStore> = Lazy::new(CartStore::new);

/// Process-wide store used by handlers and the checkout engine
pub fn store() -> &'static CartStore {
    &STORE
}

struct CartEntry {
    items: Vec<CartItem>,
    touched: Instant,
}

#[derive(Default)]
pub struct CartStore {
    carts: RwLock<HashMap<String, CartEntry>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            carts: RwLock::new(HashMap::new()),
        }
    }

    /// Current cart contents; an empty list for unknown or expired sessions
    pub fn get_cart(&self, session_id: &str) -> Vec<CartItem> {
        let mut carts = self.carts.write().expect("cart store lock poisoned");
        match carts.get_mut(session_id) {
            Some(entry) if entry.touched.elapsed() <= CART_IDLE_TIMEOUT => {
                entry.touched = Instant::now();
                entry.items.clone()
            }
            Some(_) => {
                carts.remove(session_id);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Add a line to the cart. At most one line per event: re-adding the
    /// same event increments its quantity instead of duplicating.
    pub fn add_item(&self, session_id: &str, snapshot: CartItem) -> Result<Vec<CartItem>, AppError> {
        if snapshot.quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let mut items = self.get_cart(session_id);
        match items.iter_mut().find(|i| i.event_id == snapshot.event_id) {
            Some(existing) => existing.quantity += snapshot.quantity,
            None => items.push(snapshot),
        }
        self.save(session_id, items.clone());
        Ok(items)
    }

    /// Set a line's quantity. Zero or negative removes the line entirely
    /// (deliberate policy, not an error); unknown events are a no-op.
    pub fn update_quantity(&self, session_id: &str, event_id: EventId, quantity: i32) -> Vec<CartItem> {
        let mut items = self.get_cart(session_id);
        if items.iter().any(|i| i.event_id == event_id) {
            if quantity <= 0 {
                items.retain(|i| i.event_id != event_id);
            } else if let Some(item) = items.iter_mut().find(|i| i.event_id == event_id) {
                item.quantity = quantity;
            }
            self.save(session_id, items.clone());
        }
        items
    }

    /// Remove a line if present; no-op otherwise
    pub fn remove_item(&self, session_id: &str, event_id: EventId) -> Vec<CartItem> {
        let mut items = self.get_cart(session_id);
        items.retain(|i| i.event_id != event_id);
        self.save(session_id, items.clone());
        items
    }

    /// Empty the cart
    pub fn clear(&self, session_id: &str) {
        let mut carts = self.carts.write().expect("cart store lock poisoned");
        carts.remove(session_id);
    }

    fn save(&self, session_id: &str, items: Vec<CartItem>) {
        let mut carts = self.carts.write().expect("cart store lock poisoned");
        if items.is_empty() {
            carts.remove(session_id);
        } else {
            carts.insert(
                session_id.to_string(),
                CartEntry {
                    items,
                    touched: Instant::now(),
                },
            );
        }
    }
}

/// Assemble the cart view model (items plus derived totals)
pub fn view(session_id: &str, items: Vec<CartItem>) -> CartView {
    let cart_count = items.iter().map(|i| i.quantity).sum();
    let total_cost = items.iter().map(|i| i.subtotal()).sum();
    CartView {
        session_id: session_id.to_string(),
        items,
        cart_count,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::domain::a002_event::aggregate::EventId;

    fn item(event_id: EventId, price: f64, quantity: i32) -> CartItem {
        CartItem {
            event_id,
            event_title: "Jazz Night".to_string(),
            category_name: "Music".to_string(),
            event_date_time: Utc::now(),
            ticket_price: price,
            available_tickets: 100,
            quantity,
        }
    }

    #[test]
    fn add_merges_lines_for_the_same_event() {
        let store = CartStore::new();
        let event = EventId::new_v4();

        store.add_item("s1", item(event, 25.0, 2)).unwrap();
        let items = store.add_item("s1", item(event, 25.0, 3)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn add_rejects_quantity_below_one() {
        let store = CartStore::new();
        let result = store.add_item("s1", item(EventId::new_v4(), 25.0, 0));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.get_cart("s1").is_empty());
    }

    #[test]
    fn update_to_zero_removes_the_line() {
        let store = CartStore::new();
        let event = EventId::new_v4();
        store.add_item("s1", item(event, 25.0, 2)).unwrap();

        let items = store.update_quantity("s1", event, 0);
        assert!(items.is_empty());
        assert!(store.get_cart("s1").is_empty());
    }

    #[test]
    fn update_sets_quantity_for_existing_line() {
        let store = CartStore::new();
        let event = EventId::new_v4();
        store.add_item("s1", item(event, 25.0, 2)).unwrap();

        let items = store.update_quantity("s1", event, 7);
        assert_eq!(items[0].quantity, 7);
    }

    #[test]
    fn update_of_unknown_event_is_a_noop() {
        let store = CartStore::new();
        let event = EventId::new_v4();
        store.add_item("s1", item(event, 25.0, 2)).unwrap();

        let items = store.update_quantity("s1", EventId::new_v4(), 4);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn remove_and_clear_empty_the_cart() {
        let store = CartStore::new();
        let first = EventId::new_v4();
        let second = EventId::new_v4();
        store.add_item("s1", item(first, 25.0, 1)).unwrap();
        store.add_item("s1", item(second, 15.0, 1)).unwrap();

        let items = store.remove_item("s1", first);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].event_id, second);

        store.clear("s1");
        assert!(store.get_cart("s1").is_empty());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = CartStore::new();
        store.add_item("s1", item(EventId::new_v4(), 25.0, 1)).unwrap();
        assert!(store.get_cart("s2").is_empty());
    }

    #[test]
    fn view_totals_sum_subtotals() {
        let store = CartStore::new();
        store.add_item("s1", item(EventId::new_v4(), 25.0, 2)).unwrap();
        store.add_item("s1", item(EventId::new_v4(), 15.0, 3)).unwrap();

        let view = view("s1", store.get_cart("s1"));
        assert_eq!(view.cart_count, 5);
        assert_eq!(view.total_cost, 25.0 * 2.0 + 15.0 * 3.0);
    }
}
