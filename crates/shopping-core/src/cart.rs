//! # Cart Contract
//!
//! The `CartStore` trait every backend implements, the `CartItem` snapshot
//! it hands out, and the change-notification hook consumers register.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartStore Operations                                 │
//! │                                                                         │
//! │  Operation           Absent product          Present product            │
//! │  ─────────           ──────────────          ───────────────            │
//! │  increase_quantity   add with qty 1          qty + 1                    │
//! │  decrease_quantity   NotFound                qty - 1, or delete at 1    │
//! │  set_quantity        add with qty            replace qty, keep id       │
//! │  delete_cart_item    NotFound                remove                     │
//! │  find                NotFound                item                       │
//! │  find_or_none        None                    Some(item)                 │
//! │                                                                         │
//! │  find_range(page, size)   ordered slice, empty past the end             │
//! │  total_count()            number of lines                               │
//! │  total_quantity()         sum of counts                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `increase` treats "not in the cart" as quantity 0 and always succeeds.
//! `decrease` on something never added is a caller error and is surfaced.

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};
use crate::quantity::Quantity;
use crate::types::{CartItemId, ProductId};

// =============================================================================
// Cart Item
// =============================================================================

/// One cart line: a product and how many of it.
///
/// Values are snapshots. Changing a quantity produces a new `CartItem` with
/// the same `id` and `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn new(id: CartItemId, product_id: ProductId, quantity: Quantity) -> Self {
        CartItem {
            id,
            product_id,
            quantity,
        }
    }

    /// Same line, different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: Quantity) -> Self {
        CartItem {
            quantity,
            ..self.clone()
        }
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// The cart repository contract.
///
/// Implementations own the collection exclusively; callers only go through
/// these methods. All methods take `&self` so a store can be shared behind
/// an `Arc` across threads.
pub trait CartStore: Send + Sync {
    /// Adds one of the product, creating the line with quantity 1 if needed.
    ///
    /// A line already at `u32::MAX` is unchanged and the call fails with
    /// `InvalidArgument(OutOfRange)`.
    fn increase_quantity(&self, product_id: ProductId) -> CartResult<()>;

    /// Removes one of the product. A line at quantity 1 is deleted.
    fn decrease_quantity(&self, product_id: ProductId) -> CartResult<()>;

    /// Upserts the line with an explicit quantity, keeping an existing id.
    fn set_quantity(&self, product_id: ProductId, quantity: Quantity) -> CartResult<()>;

    /// Deletes the line for the product.
    fn delete_cart_item(&self, product_id: ProductId) -> CartResult<()>;

    /// Returns the line for the product, or `None`.
    fn find_or_none(&self, product_id: ProductId) -> CartResult<Option<CartItem>>;

    /// Returns `[page * page_size, min(page * page_size + page_size, len))`.
    fn find_range(&self, page: usize, page_size: usize) -> CartResult<Vec<CartItem>>;

    /// Number of distinct lines.
    fn total_count(&self) -> CartResult<usize>;

    /// Sum of all line quantities.
    fn total_quantity(&self) -> CartResult<u64>;

    /// Returns the line for the product or fails with NotFound.
    fn find(&self, product_id: ProductId) -> CartResult<CartItem> {
        self.find_or_none(product_id)?
            .ok_or(CartError::CartItemNotFound(product_id))
    }
}

// =============================================================================
// Change Notification
// =============================================================================

/// A change applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new line was created.
    Added(CartItem),
    /// An existing line got a new quantity.
    QuantityChanged(CartItem),
    /// The line for this product is gone.
    Removed(ProductId),
}

impl CartEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            CartEvent::Added(item) | CartEvent::QuantityChanged(item) => item.product_id,
            CartEvent::Removed(product_id) => *product_id,
        }
    }
}

/// Hook for consumers that want to be told about cart changes.
///
/// Called after the change is applied, one event at a time and in the order
/// the changes were applied. Stores call it while still holding their own
/// lock (or from their worker thread), so implementations must not call
/// back into the store.
pub trait CartObserver: Send + Sync {
    fn on_change(&self, event: &CartEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl CartObserver for NoOpObserver {
    fn on_change(&self, _event: &CartEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_quantity_keeps_identity() {
        let item = CartItem::new(CartItemId::new(3), ProductId::new(10), Quantity::MIN);
        let changed = item.with_quantity(Quantity::new(4).unwrap());

        assert_eq!(changed.id, item.id);
        assert_eq!(changed.product_id, item.product_id);
        assert_eq!(changed.quantity.count(), 4);
        assert_eq!(item.quantity, Quantity::MIN);
    }

    #[test]
    fn test_event_product_id() {
        let item = CartItem::new(CartItemId::new(1), ProductId::new(5), Quantity::MIN);
        assert_eq!(CartEvent::Added(item.clone()).product_id(), ProductId::new(5));
        assert_eq!(CartEvent::QuantityChanged(item).product_id(), ProductId::new(5));
        assert_eq!(CartEvent::Removed(ProductId::new(8)).product_id(), ProductId::new(8));
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(CartEvent::Removed(ProductId::new(2))).unwrap();
        assert_eq!(json["type"], "removed");
    }
}
