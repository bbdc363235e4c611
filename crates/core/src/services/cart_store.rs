use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::cart::{self, CartLine, CartSnapshot};
use crate::models::product::Product;
use crate::storage::record;
use crate::storage::traits::DurableStorage;

use super::notifier::{Notifier, SubscriptionId};

/// What `initialize` / `reload` found in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No record under the cart key; started empty.
    Empty,
    /// Record adopted; holds this many lines.
    Restored(usize),
    /// Record was malformed; it was deleted and the cart started empty.
    Discarded,
    /// Storage could not be read; in-memory lines kept, record left untouched.
    Unavailable,
    /// `initialize` had already run; nothing was read.
    AlreadyInitialized,
}

/// Result of `remove_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No line for that product; nothing changed.
    NotFound,
    /// Quantity lowered to the contained value.
    Decremented(u32),
    /// The line is gone.
    Removed,
}

/// The session's shopping cart.
///
/// Holds the cart lines in insertion order, mirrors them to durable storage
/// after every mutation, and publishes a `CartSnapshot` to every subscriber
/// before each mutating call returns.
///
/// Durable storage is best-effort: read and write failures are logged and
/// never abort an operation. The in-memory lines are authoritative for the
/// lifetime of the store.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn DurableStorage>,
    key: String,
    observers: Notifier<CartSnapshot>,
    ready: bool,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines.len())
            .field("item_count", &self.item_count())
            .field("storage", &self.storage.name())
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .field("ready", &self.ready)
            .finish()
    }
}

impl CartStore {
    /// Create a store that has not read durable storage yet.
    ///
    /// `is_ready()` stays `false` until `initialize` runs, so views can show a
    /// placeholder instead of a momentarily empty cart.
    pub fn new(storage: Arc<dyn DurableStorage>, key: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            storage,
            key: key.into(),
            observers: Notifier::new(),
            ready: false,
        }
    }

    /// Create and initialize in one step.
    pub fn open(storage: Arc<dyn DurableStorage>, key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, key);
        store.initialize();
        store
    }

    /// Load the durable record once. Never fails: an unreadable or malformed
    /// record yields an empty cart. Subscribers are notified of the loaded state.
    pub fn initialize(&mut self) -> LoadOutcome {
        if self.ready {
            return LoadOutcome::AlreadyInitialized;
        }
        let outcome = self.load();
        self.ready = true;
        self.notify();
        outcome
    }

    /// Replace the in-memory cart with whatever durable storage holds now.
    ///
    /// Another session writing the same key is invisible until this is called.
    /// If storage cannot be read the current lines stay as they are.
    pub fn reload(&mut self) -> LoadOutcome {
        let outcome = self.load();
        self.ready = true;
        self.notify();
        outcome
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Add one unit of `product`. Returns the product's new quantity.
    pub fn add_one(&mut self, product: &Product) -> u32 {
        self.ensure_ready();

        let quantity = match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.cart_quantity = line.cart_quantity.saturating_add(1);
                line.cart_quantity
            }
            None => {
                self.lines.push(CartLine::new(product.clone()));
                1
            }
        };

        tracing::debug!(
            product_id = %product.id,
            quantity,
            lines = self.lines.len(),
            items = self.item_count(),
            "added to cart"
        );

        self.persist();
        self.notify();
        quantity
    }

    /// Remove one unit of a product, or the whole line when `remove_all` is set
    /// or only one unit is left. A product that is not in the cart is ignored.
    pub fn remove_one(&mut self, product_id: &str, remove_all: bool) -> RemoveOutcome {
        self.ensure_ready();

        let Some(idx) = self.lines.iter().position(|l| l.product.id == product_id) else {
            tracing::debug!(product_id, "remove ignored, product not in cart");
            return RemoveOutcome::NotFound;
        };

        let outcome = if remove_all || self.lines[idx].cart_quantity <= 1 {
            self.lines.remove(idx);
            RemoveOutcome::Removed
        } else {
            let line = &mut self.lines[idx];
            line.cart_quantity -= 1;
            RemoveOutcome::Decremented(line.cart_quantity)
        };

        tracing::debug!(product_id, ?outcome, items = self.item_count(), "removed from cart");

        self.persist();
        self.notify();
        outcome
    }

    /// Empty the cart and delete the durable record.
    pub fn clear(&mut self) {
        self.ensure_ready();
        self.lines.clear();
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to delete cart record");
        }
        tracing::info!("cart cleared");
        self.notify();
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map_or(0, |l| l.cart_quantity)
    }

    /// Σ `selling_price × cart_quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        cart::total_of(&self.lines)
    }

    /// Σ `cart_quantity`. Use `line_count` for the number of distinct products.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        cart::item_count_of(&self.lines)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_lines(&self.lines)
    }

    // ── Observers ───────────────────────────────────────────────────

    /// Register an observer. It is called with a fresh snapshot after every
    /// mutation until `unsubscribe` is called with the returned id.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(CartSnapshot) + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ── Internal ────────────────────────────────────────────────────

    /// A mutation before `initialize` must not overwrite a persisted cart with
    /// an empty one, so load first.
    fn ensure_ready(&mut self) {
        if !self.ready {
            self.load();
            self.ready = true;
        }
    }

    /// Adopt the durable record. When storage cannot be read the current
    /// lines are kept: empty on first load, the session's cart on reload.
    fn load(&mut self) -> LoadOutcome {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.lines.clear();
                return LoadOutcome::Empty;
            }
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    lines = self.lines.len(),
                    error = %e,
                    "cart record unreadable, keeping in-memory cart"
                );
                return LoadOutcome::Unavailable;
            }
        };

        match record::decode_cart(&raw) {
            Ok(lines) => {
                tracing::info!(key = %self.key, lines = lines.len(), "cart restored");
                let count = lines.len();
                self.lines = lines;
                LoadOutcome::Restored(count)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding malformed cart record");
                if let Err(e) = self.storage.remove(&self.key) {
                    tracing::warn!(key = %self.key, error = %e, "failed to delete malformed cart record");
                }
                self.lines.clear();
                LoadOutcome::Discarded
            }
        }
    }

    fn persist(&self) {
        let encoded = match record::encode_cart(&self.lines) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &encoded) {
            tracing::warn!(
                key = %self.key,
                storage = self.storage.name(),
                error = %e,
                "failed to save cart, keeping it in memory only"
            );
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.observers.publish(&snapshot);
    }
}
