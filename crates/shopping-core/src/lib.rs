//! # shopping-core: Cart Rules Without I/O
//!
//! The cart repository contract and everything that can be decided without
//! touching a database: quantity arithmetic, line-item rules, pagination,
//! and an in-memory store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopping Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shopping-cli (consumer)                      │   │
//! │  │    increase ──► decrease ──► show ──► summary                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dyn CartStore                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopping-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ quantity  │  │   cart    │  │pagination │  │  memory   │  │   │
//! │  │   │ Quantity  │  │ CartStore │  │PageRequest│  │ InMemory  │  │   │
//! │  │   │           │  │ CartItem  │  │ PageInfo  │  │ CartStore │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           shopping-db (SQLite + worker-backed store)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Positive item count with floor-at-one arithmetic
//! - [`cart`] - `CartItem`, the `CartStore` trait, change events
//! - [`memory`] - Mutex-guarded in-memory `CartStore`
//! - [`pagination`] - Page windows and navigation
//! - [`catalog`] - Read-only product lookup
//! - [`summary`] - Priced cart totals
//! - [`money`], [`types`], [`error`]
//!
//! ## Example Usage
//!
//! ```rust
//! use shopping_core::{CartStore, InMemoryCartStore, ProductId};
//!
//! let store = InMemoryCartStore::new();
//! let apple = ProductId::new(1);
//!
//! store.increase_quantity(apple).unwrap();
//! store.increase_quantity(apple).unwrap();
//! assert_eq!(store.find(apple).unwrap().quantity.count(), 2);
//!
//! store.decrease_quantity(apple).unwrap();
//! store.decrease_quantity(apple).unwrap();
//! assert!(store.find_or_none(apple).unwrap().is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod money;
pub mod pagination;
pub mod quantity;
pub mod summary;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartEvent, CartItem, CartObserver, CartStore, NoOpObserver};
pub use catalog::{InMemoryCatalog, ProductCatalog};
pub use error::{CartError, CartResult, ErrorKind, ValidationError};
pub use memory::{Cart, InMemoryCartStore};
pub use money::Money;
pub use pagination::{PageInfo, PageRequest};
pub use quantity::Quantity;
pub use summary::{CartLine, CartSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Lines shown per cart page.
pub const DEFAULT_CART_PAGE_SIZE: usize = 5;

/// Products shown per catalog page.
pub const CATALOG_PAGE_SIZE: usize = 20;
