//! # shopping-db: SQLite Storage and the Cart Worker
//!
//! This crate persists cart lines and catalog products in SQLite, and
//! provides a `CartStore` whose database handle is owned by one worker
//! thread.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopping Cart Data Flow                          │
//! │                                                                         │
//! │  CLI command (increase 42)                                             │
//! │       │  dyn CartStore                                                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shopping-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    worker     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │               │───►│ CartItemRepo  │    │  (embedded)  │  │   │
//! │  │   │ WorkerBacked  │    │ ProductRepo   │    │ 001_cart_    │  │   │
//! │  │   │ CartStore     │    │               │    │  schema.sql  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ Database (pool.rs)            │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                           SQLite file (WAL)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the cart database (`DbConfig`, `Database`)
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Cart and product repositories
//! - [`backend`] - `CartBackend` contract and the cart rules over it
//! - [`worker`] - `WorkerBackedCartStore`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopping_core::{CartStore, ProductId};
//! use shopping_db::{DbConfig, WorkerBackedCartStore};
//!
//! let store = WorkerBackedCartStore::open(DbConfig::new("shopping.db"))?;
//! store.increase_quantity(ProductId::new(42))?;
//! let first_page = store.find_range(0, 5)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod worker;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{apply_command, run_query, CartBackend, CartCommand, CartQuery, QueryReply};
pub use error::{DbError, DbResult};
pub use pool::{default_database_path, Database, DbConfig, DbLocation, DEFAULT_DATABASE_FILE};
pub use migrations::MigrationStatus;
pub use worker::{WorkerBackedCartStore, WorkerFailure};

// Repository re-exports for convenience
pub use repository::cart::CartItemRepository;
pub use repository::product::ProductRepository;
