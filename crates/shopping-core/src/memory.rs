//! # In-Memory Cart Store
//!
//! The synchronous `CartStore` backend: an ordered `Vec` guarded by one
//! coarse `Mutex`.
//!
//! ## Thread Safety
//! The cart is wrapped in `Mutex<Cart>` because:
//! 1. Multiple consumers may read/modify the cart
//! 2. Only one operation should touch the collection at a time
//! 3. Observers run before the lock is released, so events keep the order
//!    of the changes; an observer must not call back into the store
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    In-Memory Store Operations                           │
//! │                                                                         │
//! │  Consumer call          Cart mutation                Event              │
//! │  ─────────────          ─────────────                ─────              │
//! │  increase_quantity ───► items.push / items[i].qty+1  Added / Changed    │
//! │  decrease_quantity ───► items[i].qty-1 / remove(i)   Changed / Removed  │
//! │  set_quantity ────────► items.push / items[i].qty=n  Added / Changed    │
//! │  delete_cart_item ────► items.remove(i)              Removed            │
//! │  find / find_range ───► (read only)                  -                  │
//! │                                                                         │
//! │  NOTE: Every call takes the lock exclusively and releases it before     │
//! │        notifying the observer.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::cart::{CartEvent, CartItem, CartObserver, CartStore, NoOpObserver};
use crate::error::{CartError, CartResult};
use crate::pagination::PageRequest;
use crate::quantity::Quantity;
use crate::types::{CartItemId, ProductId};

// =============================================================================
// Cart Collection
// =============================================================================

/// The ordered cart collection and its id counter.
///
/// ## Invariants
/// - Items are unique by `product_id`
/// - Items stay in insertion order; quantity changes happen in place
/// - `next_id` is strictly greater than every id ever handed out
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
    next_id: CartItemId,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates an empty cart whose first line gets id 1.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            next_id: CartItemId::FIRST,
        }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }

    fn push(&mut self, product_id: ProductId, quantity: Quantity) -> CartItem {
        let item = CartItem::new(self.next_id, product_id, quantity);
        self.next_id = self.next_id.next();
        self.items.push(item.clone());
        item
    }

    fn replace(&mut self, index: usize, quantity: Quantity) -> CartItem {
        let updated = self.items[index].with_quantity(quantity);
        self.items[index] = updated.clone();
        updated
    }

    /// Adds one of the product. A line already at `u32::MAX` is left as is
    /// and the call fails with `InvalidArgument`.
    pub fn increase(&mut self, product_id: ProductId) -> CartResult<CartEvent> {
        match self.position(product_id) {
            Some(index) => {
                let quantity = self.items[index].quantity.increment()?;
                Ok(CartEvent::QuantityChanged(self.replace(index, quantity)))
            }
            None => Ok(CartEvent::Added(self.push(product_id, Quantity::MIN))),
        }
    }

    /// Removes one of the product; the line goes away at quantity 1.
    pub fn decrease(&mut self, product_id: ProductId) -> CartResult<CartEvent> {
        let index = self
            .position(product_id)
            .ok_or(CartError::CartItemNotFound(product_id))?;

        match self.items[index].quantity.checked_decrement() {
            Some(quantity) => Ok(CartEvent::QuantityChanged(self.replace(index, quantity))),
            None => {
                self.items.remove(index);
                Ok(CartEvent::Removed(product_id))
            }
        }
    }

    /// Upserts the line with the given quantity.
    pub fn set(&mut self, product_id: ProductId, quantity: Quantity) -> CartEvent {
        match self.position(product_id) {
            Some(index) => CartEvent::QuantityChanged(self.replace(index, quantity)),
            None => CartEvent::Added(self.push(product_id, quantity)),
        }
    }

    /// Removes the line for the product.
    pub fn remove(&mut self, product_id: ProductId) -> CartResult<CartEvent> {
        let index = self
            .position(product_id)
            .ok_or(CartError::CartItemNotFound(product_id))?;
        self.items.remove(index);
        Ok(CartEvent::Removed(product_id))
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// All lines, oldest first.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|i| u64::from(i.quantity.count()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// `CartStore` that keeps everything in process memory.
///
/// Deterministic and never suspends: every call runs on the caller's thread.
pub struct InMemoryCartStore {
    cart: Mutex<Cart>,
    observer: Arc<dyn CartObserver>,
}

impl std::fmt::Debug for InMemoryCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_observer(Arc::new(NoOpObserver))
    }

    /// Creates an empty store that reports every change to `observer`.
    pub fn with_observer(observer: Arc<dyn CartObserver>) -> Self {
        InMemoryCartStore {
            cart: Mutex::new(Cart::new()),
            observer,
        }
    }

    /// Creates a store pre-filled with lines, in the given order.
    ///
    /// Later duplicates of a product overwrite the earlier quantity.
    pub fn from_lines(lines: impl IntoIterator<Item = (ProductId, Quantity)>) -> Self {
        let mut cart = Cart::new();
        for (product_id, quantity) in lines {
            cart.set(product_id, quantity);
        }
        InMemoryCartStore {
            cart: Mutex::new(cart),
            observer: Arc::new(NoOpObserver),
        }
    }

    fn lock(&self) -> CartResult<MutexGuard<'_, Cart>> {
        self.cart
            .lock()
            .map_err(|_| CartError::backend("cart mutex poisoned"))
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> CartResult<R>
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock()?;
        Ok(f(&cart))
    }

    /// Runs a mutation and notifies the observer before releasing the lock,
    /// so events arrive in the order the changes were applied.
    fn mutate<F>(&self, f: F) -> CartResult<()>
    where
        F: FnOnce(&mut Cart) -> CartResult<CartEvent>,
    {
        let mut cart = self.lock()?;
        let event = f(&mut cart)?;
        debug!(?event, "Cart changed");
        self.observer.on_change(&event);
        drop(cart);
        Ok(())
    }
}

impl CartStore for InMemoryCartStore {
    fn increase_quantity(&self, product_id: ProductId) -> CartResult<()> {
        self.mutate(|cart| cart.increase(product_id))
    }

    fn decrease_quantity(&self, product_id: ProductId) -> CartResult<()> {
        self.mutate(|cart| cart.decrease(product_id))
    }

    fn set_quantity(&self, product_id: ProductId, quantity: Quantity) -> CartResult<()> {
        self.mutate(|cart| Ok(cart.set(product_id, quantity)))
    }

    fn delete_cart_item(&self, product_id: ProductId) -> CartResult<()> {
        self.mutate(|cart| cart.remove(product_id))
    }

    fn find_or_none(&self, product_id: ProductId) -> CartResult<Option<CartItem>> {
        self.with_cart(|cart| cart.get(product_id).cloned())
    }

    fn find_range(&self, page: usize, page_size: usize) -> CartResult<Vec<CartItem>> {
        let request = PageRequest::new(page, page_size)?;
        self.with_cart(|cart| request.slice(cart.items()).to_vec())
    }

    fn total_count(&self) -> CartResult<usize> {
        self.with_cart(Cart::item_count)
    }

    fn total_quantity(&self) -> CartResult<u64> {
        self.with_cart(Cart::total_quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
