//! Cart manager.
//!
//! Owns the `kisan_setu.cart` slice of the store: an ordered collection of
//! product entries, at most one per product ID. All operations are
//! synchronous and persist before returning; if the store is unavailable
//! the cart degrades to memory-only for this manager's lifetime rather than
//! failing the page.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;

use kisan_setu_core::{CartEntry, Product, ProductId};

use crate::store::{KeyValueStore, StoreExt, keys};

/// Manages the persisted cart.
pub struct CartManager {
    store: Arc<dyn KeyValueStore>,
    /// Authoritative copy for this page lifetime; kept so mutations survive
    /// a store that stops accepting writes.
    entries: Mutex<Vec<CartEntry>>,
}

impl CartManager {
    /// Create a manager over `store`, loading any persisted cart.
    ///
    /// A corrupt or unreadable stored cart starts empty.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.read_json::<Vec<CartEntry>>(keys::CART) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "cart storage unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    /// Current cart entries in insertion order.
    #[must_use]
    pub fn cart(&self) -> Vec<CartEntry> {
        self.lock().clone()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing entry's quantity if the product is already in
    /// the cart, otherwise appends a new entry with quantity 1 carrying every
    /// product field through. Returns the updated cart.
    pub fn add(&self, product: Product) -> Vec<CartEntry> {
        let mut entries = self.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.product.id == product.id) {
            entry.quantity += 1;
        } else {
            entries.push(CartEntry::new(product));
        }
        self.persist(&entries);
        entries.clone()
    }

    /// Remove one unit of the product with `product_id`.
    ///
    /// Decrements the quantity; an entry that would reach zero is deleted
    /// entirely. Unknown IDs are a no-op. Returns the updated cart.
    pub fn remove(&self, product_id: ProductId) -> Vec<CartEntry> {
        let mut entries = self.lock();
        if let Some(pos) = entries.iter().position(|e| e.product.id == product_id) {
            #[allow(clippy::indexing_slicing)] // position() just returned a valid index
            if entries[pos].quantity > 1 {
                entries[pos].quantity -= 1;
            } else {
                entries.remove(pos);
            }
            self.persist(&entries);
        }
        entries.clone()
    }

    /// Delete every entry. Returns the (empty) cart.
    pub fn clear(&self) -> Vec<CartEntry> {
        let mut entries = self.lock();
        entries.clear();
        if let Err(e) = self.store.remove(keys::CART) {
            tracing::warn!(error = %e, "cart clear not persisted, continuing in memory");
        }
        entries.clone()
    }

    /// Sum of unit price times quantity over all entries.
    ///
    /// A malformed price contributes zero; the error is logged, never
    /// propagated.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock()
            .iter()
            .map(|entry| {
                if entry.product.unit_price().is_none() {
                    tracing::warn!(
                        product_id = %entry.product.id,
                        "unparseable price, counting as zero in cart total"
                    );
                }
                entry.line_total()
            })
            .sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &[CartEntry]) {
        if let Err(e) = self.store.write_json(keys::CART, &entries) {
            tracing::warn!(error = %e, "cart not persisted, continuing in memory");
        }
    }
}
