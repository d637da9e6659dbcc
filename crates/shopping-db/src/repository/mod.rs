//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart worker / seed binary / CLI                                       │
//! │       │                                                                 │
//! │       │  db.carts().upsert(product_id, quantity)                       │
//! │       ▼                                                                 │
//! │  CartItemRepository                 ProductRepository                   │
//! │  ├── get_by_product                 ├── find                            │
//! │  ├── upsert                         ├── find_range                      │
//! │  ├── delete_by_product              ├── all / count                     │
//! │  └── list / count / total_quantity  └── insert                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart::CartItemRepository`] - Cart lines; implements `CartBackend`
//! - [`product::ProductRepository`] - Catalog reads and seeding

pub mod cart;
pub mod product;
