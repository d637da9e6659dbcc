//! # Cart Summary
//!
//! Cart totals joined with catalog prices, for checkout-style screens.

use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartStore};
use crate::catalog::ProductCatalog;
use crate::error::CartResult;
use crate::money::Money;
use crate::types::Product;

/// A cart line with its product and line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
    pub line_total: Money,
}

/// Totals for the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub item_count: usize,
    /// Sum of all quantities.
    pub total_quantity: u64,
    /// Σ price × quantity.
    pub subtotal: Money,
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    /// Prices every line of `store` against `catalog`.
    ///
    /// Fails with `ProductNotFound` if a line references a product the
    /// catalog does not know.
    pub fn compute(store: &dyn CartStore, catalog: &dyn ProductCatalog) -> CartResult<Self> {
        let item_count = store.total_count()?;
        let items = if item_count == 0 {
            Vec::new()
        } else {
            store.find_range(0, item_count)?
        };

        let lines = items
            .into_iter()
            .map(|item| {
                let product = catalog.find_product(item.product_id)?;
                let line_total = product.price * item.quantity.count();
                Ok(CartLine {
                    item,
                    product,
                    line_total,
                })
            })
            .collect::<CartResult<Vec<_>>>()?;

        Ok(CartSummary {
            item_count: lines.len(),
            total_quantity: lines
                .iter()
                .map(|l| u64::from(l.item.quantity.count()))
                .sum(),
            subtotal: lines.iter().map(|l| l.line_total).sum(),
            lines,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::CartError;
    use crate::memory::InMemoryCartStore;
    use crate::quantity::Quantity;
    use crate::types::ProductId;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Product::new(ProductId::new(1), "Apple", "a.png", Money::from_minor(1200)),
            Product::new(ProductId::new(2), "Pear", "p.png", Money::from_minor(350)),
        ])
    }

    #[test]
    fn test_subtotal() {
        let store = InMemoryCartStore::from_lines([
            (ProductId::new(1), Quantity::new(3).unwrap()),
            (ProductId::new(2), Quantity::new(2).unwrap()),
        ]);

        let summary = CartSummary::compute(&store, &catalog()).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.subtotal.minor(), 3600 + 700);
        assert_eq!(summary.lines[0].product.title, "Apple");
    }

    #[test]
    fn test_empty_cart() {
        let summary = CartSummary::compute(&InMemoryCartStore::new(), &catalog()).unwrap();
        assert!(summary.is_empty());
        assert!(summary.subtotal.is_zero());
    }

    #[test]
    fn test_unknown_product() {
        let store = InMemoryCartStore::new();
        store.increase_quantity(ProductId::new(99)).unwrap();

        let err = CartSummary::compute(&store, &catalog()).unwrap_err();
        assert_eq!(err, CartError::ProductNotFound(ProductId::new(99)));
    }
}
