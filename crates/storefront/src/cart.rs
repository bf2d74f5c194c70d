//! Persisted shopping cart.
//!
//! [`CartStore`] owns the ordered line items for the current session and
//! mirrors them into one key-value slot after every mutation. Views read the
//! derived [`CartStore::item_count`] and [`CartStore::total`] and call the four
//! mutating operations; they never touch the line items directly.
//!
//! # Invariants
//!
//! - Line items are unique by product ID (adding an existing product merges
//!   quantities).
//! - Every stored quantity is at least 1.
//! - Insertion order is preserved.
//!
//! # Persistence
//!
//! The slot holds a JSON array shaped like
//! `[{"id":1,"name":"Mug","price":9.99,"quantity":2,"thumbnailUrl":"..."}]`.
//! Storage failures never reach the caller: a corrupt slot loads as an empty
//! cart and a failed write is logged, leaving the in-memory cart as the source
//! of truth until the next mutation writes it again.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use ecwid_shop_core::{Price, ProductId, format_amount};

use crate::catalog::Product;
use crate::storage::{KeyValueStore, keys};

/// One product-plus-quantity row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Ecwid product ID (unique within the cart).
    pub id: ProductId,
    /// Product name captured when the item was first added.
    pub name: String,
    /// Unit price captured when the item was first added.
    #[serde(rename = "price")]
    pub unit_price: Price,
    /// Number of units, always at least 1.
    pub quantity: u32,
    /// Small product image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Full-size product image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// Build a new line item from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            thumbnail_url: product.thumbnail_url.clone(),
            image_url: product.image_url.clone(),
        }
    }

    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// Persisted record shape, lenient about quantity so a bad row can be
/// dropped without discarding the whole cart.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    id: ProductId,
    name: String,
    price: Price,
    quantity: i64,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// What a mutation did, passed to change listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended.
    Added { id: ProductId, quantity: u32 },
    /// An existing line item's quantity changed.
    QuantityChanged { id: ProductId, quantity: u32 },
    /// A line item was removed.
    Removed { id: ProductId },
    /// The cart was emptied.
    Cleared,
}

/// Callback invoked after every mutation with the change and the new items.
pub type CartListener = Box<dyn FnMut(&CartChange, &[LineItem])>;

/// Owned cart state plus its persistence slot.
///
/// Mutations take `&mut self`: the cart is driven from a single thread and an
/// operation always runs to completion (mutate, persist, notify) before the
/// next one starts.
pub struct CartStore<S: KeyValueStore> {
    items: Vec<LineItem>,
    storage: S,
    key: String,
    listeners: Vec<CartListener>,
    persist_failed: bool,
}

impl<S: KeyValueStore> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("key", &self.key)
            .field("listeners", &self.listeners.len())
            .field("persist_failed", &self.persist_failed)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart from the default slot ([`keys::CART`]).
    ///
    /// A missing slot yields an empty cart. An unreadable or malformed slot is
    /// logged and also yields an empty cart. Nothing is written back.
    pub fn load(storage: S) -> Self {
        Self::load_from(storage, keys::CART)
    }

    /// Load the cart from a custom slot name.
    pub fn load_from(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = read_items(&storage, &key);
        debug!(slot = %key, items = items.len(), "Cart loaded");

        Self {
            items,
            storage,
            key,
            listeners: Vec::new(),
            persist_failed: false,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// An existing line item only has its quantity incremented; its name,
    /// price and images keep the values from when it was first added. A new
    /// product is appended at the end. A zero quantity does nothing.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = %product.id, "Ignoring add with zero quantity");
            return;
        }

        let change = if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
            CartChange::QuantityChanged {
                id: item.id,
                quantity: item.quantity,
            }
        } else {
            self.items.push(LineItem::from_product(product, quantity));
            CartChange::Added {
                id: product.id,
                quantity,
            }
        };

        self.commit(&change);
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: &Product) {
        self.add_to_cart(product, 1);
    }

    /// Remove the line item for `id`. Returns `false` (and does nothing) if the
    /// product is not in the cart.
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };

        self.items.remove(index);
        self.commit(&CartChange::Removed { id });
        true
    }

    /// Set the quantity for `id` to exactly `quantity`.
    ///
    /// Does nothing if the product is not in the cart. A quantity of zero or
    /// less removes the line item. Returns whether a line item matched.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };

        if quantity <= 0 {
            return self.remove_from_cart(id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if item.quantity != quantity {
            item.quantity = quantity;
            self.commit(&CartChange::QuantityChanged { id, quantity });
        }
        true
    }

    /// Remove every line item.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.commit(&CartChange::Cleared);
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register a listener called after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&CartChange, &[LineItem]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of all line totals, unrounded. Saturates instead of overflowing.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Cart total rounded to two decimals for display (e.g. `"19.98"`).
    #[must_use]
    pub fn total(&self) -> String {
        format_amount(self.total_amount())
    }

    /// Whether the most recent write to storage failed.
    #[must_use]
    pub const fn last_persist_failed(&self) -> bool {
        self.persist_failed
    }

    /// Slot name the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn commit(&mut self, change: &CartChange) {
        self.persist();
        for listener in &mut self.listeners {
            listener(change, &self.items);
        }
    }

    fn persist(&mut self) {
        let body = match serde_json::to_string(&self.items) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Error serializing cart");
                self.persist_failed = true;
                return;
            }
        };

        match self.storage.set_item(&self.key, &body) {
            Ok(()) => self.persist_failed = false,
            Err(e) => {
                error!(slot = %self.key, error = %e, "Error saving cart to storage");
                self.persist_failed = true;
            }
        }
    }
}

/// Read and sanitize the persisted cart, failing soft to an empty cart.
fn read_items<S: KeyValueStore>(storage: &S, key: &str) -> Vec<LineItem> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(slot = %key, error = %e, "Error loading cart from storage");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<StoredLineItem>>(&raw) {
        Ok(stored) => sanitize(stored),
        Err(e) => {
            warn!(slot = %key, error = %e, "Stored cart is malformed, starting empty");
            Vec::new()
        }
    }
}

/// Drop non-positive quantities and merge duplicate IDs into the first row.
fn sanitize(stored: Vec<StoredLineItem>) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::with_capacity(stored.len());

    for record in stored {
        if record.quantity <= 0 {
            warn!(product_id = %record.id, quantity = record.quantity, "Dropping stored line item");
            continue;
        }
        let quantity = u32::try_from(record.quantity).unwrap_or(u32::MAX);

        if let Some(existing) = items.iter_mut().find(|i| i.id == record.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            continue;
        }

        items.push(LineItem {
            id: record.id,
            name: record.name,
            unit_price: record.price,
            quantity,
            thumbnail_url: record.thumbnail_url,
            image_url: record.image_url,
        });
    }

    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: i64, name: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: price.parse().unwrap(),
            description: None,
            thumbnail_url: None,
            image_url: None,
        }
    }

    fn mug() -> Product {
        product(1, "Mug", "9.99")
    }

    fn empty_cart() -> CartStore<MemoryStore> {
        CartStore::load(MemoryStore::new())
    }

    fn persisted(cart: &CartStore<MemoryStore>) -> Vec<LineItem> {
        let raw = cart.storage().get_item(keys::CART).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), "19.98");
        assert_eq!(persisted(&cart), cart.items());
    }

    #[test]
    fn test_add_existing_merges_quantity() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);
        cart.add_to_cart(&mug(), 1);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), "29.97");
    }

    #[test]
    fn test_add_existing_keeps_original_details() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 1);

        let mut renamed = product(1, "Big Mug", "12.50");
        renamed.image_url = Some("https://example.test/big.png".to_string());
        cart.add_to_cart(&renamed, 1);

        let item = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(item.name, "Mug");
        assert_eq!(item.unit_price.to_string(), "9.99");
        assert_eq!(item.image_url, None);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 0);

        assert!(cart.is_empty());
        assert!(cart.storage().get_item(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut cart = empty_cart();
        cart.add_one(&product(3, "C", "1"));
        cart.add_one(&product(1, "A", "1"));
        cart.add_one(&product(2, "B", "1"));
        cart.add_one(&product(1, "A", "1"));

        let ids: Vec<i64> = cart.items().iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);
        cart.add_to_cart(&product(2, "Plate", "4.50"), 1);

        assert!(cart.update_quantity(ProductId::new(2), 5));

        assert_eq!(cart.get(ProductId::new(2)).unwrap().quantity, 5);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(persisted(&cart), cart.items());
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);

        assert!(cart.update_quantity(ProductId::new(1), 0));
        assert!(cart.is_empty());
        assert!(persisted(&cart).is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);

        cart.update_quantity(ProductId::new(1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_is_noop() {
        let mut cart = empty_cart();
        assert!(!cart.update_quantity(ProductId::new(9), 4));
        assert!(cart.is_empty());
        assert!(cart.storage().get_item(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);
        let before = cart.items().to_vec();

        assert!(!cart.remove_from_cart(ProductId::new(42)));
        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn test_clear_cart_persists_empty_sequence() {
        let mut cart = empty_cart();
        cart.add_to_cart(&mug(), 2);
        cart.add_to_cart(&product(2, "Plate", "4.50"), 1);

        cart.clear_cart();

        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), "0.00");
        assert_eq!(
            cart.storage().get_item(keys::CART).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_load_missing_slot_is_empty() {
        let cart = empty_cart();
        assert!(cart.is_empty());
        assert!(!cart.last_persist_failed());
    }

    #[test]
    fn test_load_malformed_slot_is_empty() {
        let cart = CartStore::load(MemoryStore::with_item(keys::CART, "{not json"));
        assert!(cart.is_empty());
        // Loading never writes back.
        assert_eq!(
            cart.storage().get_item(keys::CART).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_load_tolerates_missing_optional_fields() {
        let raw = r#"[{"id":1,"name":"Mug","price":9.99,"quantity":2},
                      {"id":2,"name":"Plate","price":"4.50","quantity":1,"imageUrl":"https://x.test/p.png"}]"#;
        let cart = CartStore::load(MemoryStore::with_item(keys::CART, raw));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].thumbnail_url, None);
        assert_eq!(
            cart.items()[1].image_url.as_deref(),
            Some("https://x.test/p.png")
        );
        assert_eq!(cart.total(), "24.48");
    }

    #[test]
    fn test_load_sanitizes_quantities_and_duplicates() {
        let raw = r#"[{"id":1,"name":"Mug","price":9.99,"quantity":2},
                      {"id":2,"name":"Plate","price":4.5,"quantity":0},
                      {"id":3,"name":"Bowl","price":3,"quantity":-1},
                      {"id":1,"name":"Mug again","price":1,"quantity":3}]"#;
        let cart = CartStore::load(MemoryStore::with_item(keys::CART, raw));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].name, "Mug");
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_total_saturates_on_oversized_prices() {
        let storage = MemoryStore::with_item(
            keys::CART,
            r#"[{"id":1,"name":"Big","price":1e28,"quantity":10},
                {"id":2,"name":"Bigger","price":7e28,"quantity":1}]"#,
        );
        let cart = CartStore::load(storage);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_amount(), Decimal::MAX);
        assert!(!cart.total().is_empty());
    }

    #[test]
    fn test_update_quantity_clamped_total_does_not_overflow() {
        let mut cart = empty_cart();
        cart.add_to_cart(&product(1, "Yacht", "99999999999999999999.99"), 1);
        cart.update_quantity(ProductId::new(1), i64::MAX);

        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, u32::MAX);
        assert_eq!(cart.total_amount(), Decimal::MAX);
    }

    #[test]
    fn test_write_failure_is_swallowed_and_retried() {
        let mut storage = MemoryStore::new();
        storage.set_failing(true);
        let mut cart = CartStore::load(storage);

        cart.add_to_cart(&mug(), 1);
        assert!(cart.last_persist_failed());
        assert_eq!(cart.item_count(), 1);
        assert!(cart.storage().get_item(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_next_write_carries_current_state() {
        let mut cart = CartStore::load(MemoryStore::new());
        cart.add_to_cart(&mug(), 1);
        assert!(!cart.last_persist_failed());

        cart.storage.set_failing(true);
        cart.add_to_cart(&mug(), 1);
        assert!(cart.last_persist_failed());
        assert_eq!(persisted(&cart)[0].quantity, 1);

        cart.storage.set_failing(false);
        cart.add_to_cart(&product(2, "Plate", "4.50"), 1);
        assert!(!cart.last_persist_failed());
        assert_eq!(persisted(&cart), cart.items());
        assert_eq!(persisted(&cart)[0].quantity, 2);
    }

    #[test]
    fn test_listeners_see_every_change() {
        let seen: Rc<RefCell<Vec<(CartChange, u64)>>> = Rc::default();
        let mut cart = empty_cart();
        {
            let seen = Rc::clone(&seen);
            cart.subscribe(move |change, items| {
                let count = items.iter().map(|i| u64::from(i.quantity)).sum();
                seen.borrow_mut().push((*change, count));
            });
        }

        let id = ProductId::new(1);
        cart.add_to_cart(&mug(), 2);
        cart.add_to_cart(&mug(), 1);
        cart.update_quantity(id, 7);
        cart.remove_from_cart(id);
        cart.remove_from_cart(id);
        cart.clear_cart();

        assert_eq!(
            *seen.borrow(),
            vec![
                (CartChange::Added { id, quantity: 2 }, 2),
                (CartChange::QuantityChanged { id, quantity: 3 }, 3),
                (CartChange::QuantityChanged { id, quantity: 7 }, 7),
                (CartChange::Removed { id }, 0),
                (CartChange::Cleared, 0),
            ]
        );
    }

    #[test]
    fn test_custom_slot_name() {
        let mut cart = CartStore::load_from(MemoryStore::new(), "cart-v2");
        cart.add_to_cart(&mug(), 1);

        assert_eq!(cart.key(), "cart-v2");
        assert!(cart.storage().get_item("cart-v2").unwrap().is_some());
        assert!(cart.storage().get_item(keys::CART).unwrap().is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64, u32),
        Remove(i64),
        Update(i64, i64),
        Clear,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i64..6, 1u32..5).prop_map(|(id, q)| Op::Add(id, q)),
            2 => (0i64..6).prop_map(Op::Remove),
            2 => (0i64..6, -2i64..8).prop_map(|(id, q)| Op::Update(id, q)),
            1 => Just(Op::Clear),
        ]
    }

    fn apply(cart: &mut CartStore<MemoryStore>, op: &Op) {
        match *op {
            Op::Add(id, q) => cart.add_to_cart(&product(id, "P", "1.25"), q),
            Op::Remove(id) => {
                cart.remove_from_cart(ProductId::new(id));
            }
            Op::Update(id, q) => {
                cart.update_quantity(ProductId::new(id), q);
            }
            Op::Clear => cart.clear_cart(),
        }
    }

    proptest! {
        /// Count, uniqueness and the positive-quantity invariant hold after every op.
        #[test]
        fn prop_invariants_hold(ops in prop::collection::vec(arb_op(), 0..40)) {
            let mut cart = empty_cart();
            for op in &ops {
                apply(&mut cart, op);

                let sum: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
                prop_assert_eq!(cart.item_count(), sum);

                let mut ids: Vec<ProductId> = cart.items().iter().map(|i| i.id).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), cart.items().len());

                prop_assert!(cart.items().iter().all(|i| i.quantity >= 1));
            }
        }

        /// Reloading from the slot reproduces the in-memory cart.
        #[test]
        fn prop_persisted_roundtrip(ops in prop::collection::vec(arb_op(), 1..40)) {
            let mut cart = empty_cart();
            for op in &ops {
                apply(&mut cart, op);
            }

            let reloaded = CartStore::load(cart.storage().clone());
            if cart.storage().get_item(keys::CART).unwrap().is_some() {
                prop_assert_eq!(reloaded.items(), cart.items());
            } else {
                prop_assert!(cart.is_empty());
            }
        }

        /// Setting a quantity to zero is the same as removing the item.
        #[test]
        fn prop_update_zero_equals_remove(
            ops in prop::collection::vec(arb_op(), 0..20),
            target in 0i64..6,
        ) {
            let mut via_update = empty_cart();
            let mut via_remove = empty_cart();
            for op in &ops {
                apply(&mut via_update, op);
                apply(&mut via_remove, op);
            }

            via_update.update_quantity(ProductId::new(target), 0);
            via_remove.remove_from_cart(ProductId::new(target));
            prop_assert_eq!(via_update.items(), via_remove.items());
        }

        /// Two adds of the same product merge into one row with the summed quantity.
        #[test]
        fn prop_add_twice_merges(q1 in 1u32..1000, q2 in 1u32..1000) {
            let mut cart = empty_cart();
            cart.add_to_cart(&mug(), q1);
            cart.add_to_cart(&mug(), q2);

            prop_assert_eq!(cart.items().len(), 1);
            prop_assert_eq!(cart.items()[0].quantity, q1 + q2);
        }
    }
}
