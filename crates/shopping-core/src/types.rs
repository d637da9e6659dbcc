//! # Domain Types
//!
//! Identifiers and the catalog `Product` shared by every layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductId     │   │   CartItemId    │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  i64            │   │  i64            │   │  id             │       │
//! │  │  catalog key    │   │  store-assigned │   │  title          │       │
//! │  │                 │   │  never reused   │   │  image_url      │       │
//! │  └─────────────────┘   └─────────────────┘   │  price (Money)  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both ids are newtypes so a product id can never be passed where a cart
//! item id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a catalog product. Owned by the catalog, referenced by carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        ProductId(id)
    }

    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

/// Identity of a cart line, assigned by the store at creation.
///
/// Ids increase monotonically and are never handed out twice, even after
/// the line they named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(i64);

impl CartItemId {
    /// First id handed out by an empty store.
    pub const FIRST: CartItemId = CartItemId(1);

    #[inline]
    pub const fn new(id: i64) -> Self {
        CartItemId(id)
    }

    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// The id that follows this one.
    #[inline]
    pub const fn next(&self) -> Self {
        CartItemId(self.0 + 1)
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry. Read-only from the cart's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Display name.
    pub title: String,

    /// Image location, resolved by the presentation layer.
    pub image_url: String,

    /// Unit price in minor currency units.
    pub price: Money,
}

impl Product {
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Money,
    ) -> Self {
        Product {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_id_sequence() {
        assert_eq!(CartItemId::FIRST.get(), 1);
        assert_eq!(CartItemId::FIRST.next(), CartItemId::new(2));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");

        let id: CartItemId = serde_json::from_str("9").unwrap();
        assert_eq!(id, CartItemId::new(9));
    }
}
