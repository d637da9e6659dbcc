//! # Cart Backend Contract
//!
//! The minimal persistent collection a worker-backed cart needs, and the
//! cart rules expressed once over it.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartCommand / CartQuery   (plain data, sent to the worker)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_command / run_query (cart rules: floor, NotFound, upsert)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartBackend               find / upsert / delete / range / count       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartItemRepository        (SQLite)                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rules here mirror `shopping_core::Cart` step for step, so both
//! stores hand out the same items, ids and errors.

use shopping_core::{
    CartError, CartEvent, CartItem, CartResult, PageRequest, ProductId, Quantity,
};

// =============================================================================
// Backend Trait
// =============================================================================

/// A persistent collection of cart items keyed by product.
///
/// Implementations run on the cart worker only, so they need not be `Send`.
///
/// ## Contract
/// - `upsert` keeps the id of an existing row and gives a new row an id
///   that was never used before
/// - `range` returns rows in insertion order
#[allow(async_fn_in_trait)]
pub trait CartBackend {
    async fn find(&self, product_id: ProductId) -> CartResult<Option<CartItem>>;

    async fn upsert(&self, product_id: ProductId, quantity: Quantity) -> CartResult<CartItem>;

    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, product_id: ProductId) -> CartResult<bool>;

    async fn range(&self, offset: usize, limit: usize) -> CartResult<Vec<CartItem>>;

    async fn count(&self) -> CartResult<usize>;

    async fn total_quantity(&self) -> CartResult<u64>;
}

// =============================================================================
// Commands and Queries
// =============================================================================

/// A cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Increase(ProductId),
    Decrease(ProductId),
    Set(ProductId, Quantity),
    Delete(ProductId),
}

impl CartCommand {
    pub fn product_id(&self) -> ProductId {
        match *self {
            CartCommand::Increase(id)
            | CartCommand::Decrease(id)
            | CartCommand::Set(id, _)
            | CartCommand::Delete(id) => id,
        }
    }
}

/// A cart read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartQuery {
    Find(ProductId),
    Range { page: usize, page_size: usize },
    Count,
    TotalQuantity,
}

/// Answer to a [`CartQuery`], one variant per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryReply {
    Item(Option<CartItem>),
    Items(Vec<CartItem>),
    Count(usize),
    TotalQuantity(u64),
}

// =============================================================================
// Cart Rules
// =============================================================================

/// Applies one mutation and returns what changed.
pub async fn apply_command<B: CartBackend>(
    backend: &B,
    command: CartCommand,
) -> CartResult<CartEvent> {
    match command {
        CartCommand::Increase(product_id) => match backend.find(product_id).await? {
            Some(item) => {
                let updated = backend
                    .upsert(product_id, item.quantity.increment()?)
                    .await?;
                Ok(CartEvent::QuantityChanged(updated))
            }
            None => Ok(CartEvent::Added(
                backend.upsert(product_id, Quantity::MIN).await?,
            )),
        },

        CartCommand::Decrease(product_id) => {
            let item = backend
                .find(product_id)
                .await?
                .ok_or(CartError::CartItemNotFound(product_id))?;

            match item.quantity.checked_decrement() {
                Some(quantity) => Ok(CartEvent::QuantityChanged(
                    backend.upsert(product_id, quantity).await?,
                )),
                None => {
                    backend.delete(product_id).await?;
                    Ok(CartEvent::Removed(product_id))
                }
            }
        }

        CartCommand::Set(product_id, quantity) => {
            let existed = backend.find(product_id).await?.is_some();
            let item = backend.upsert(product_id, quantity).await?;
            Ok(if existed {
                CartEvent::QuantityChanged(item)
            } else {
                CartEvent::Added(item)
            })
        }

        CartCommand::Delete(product_id) => {
            if backend.delete(product_id).await? {
                Ok(CartEvent::Removed(product_id))
            } else {
                Err(CartError::CartItemNotFound(product_id))
            }
        }
    }
}

/// Answers one read.
pub async fn run_query<B: CartBackend>(backend: &B, query: CartQuery) -> CartResult<QueryReply> {
    match query {
        CartQuery::Find(product_id) => Ok(QueryReply::Item(backend.find(product_id).await?)),

        CartQuery::Range { page, page_size } => {
            let request = PageRequest::new(page, page_size)?;
            let items = match request.offset() {
                Some(offset) => backend.range(offset, request.limit()).await?,
                None => Vec::new(),
            };
            Ok(QueryReply::Items(items))
        }

        CartQuery::Count => Ok(QueryReply::Count(backend.count().await?)),

        CartQuery::TotalQuantity => Ok(QueryReply::TotalQuantity(
            backend.total_quantity().await?,
        )),
    }
}
