//! # Product Catalog
//!
//! Read-only product lookup used by cart consumers to price and label lines.

use crate::error::{CartError, CartResult};
use crate::pagination::PageRequest;
use crate::types::{Product, ProductId};

/// Looks up catalog products by id.
pub trait ProductCatalog: Send + Sync {
    /// Returns the product, or `ProductNotFound`.
    fn find_product(&self, product_id: ProductId) -> CartResult<Product>;
}

/// An ordered in-memory snapshot of the catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        InMemoryCatalog { products }
    }

    /// One page of products in catalog order.
    pub fn find_range(&self, page: usize, page_size: usize) -> CartResult<Vec<Product>> {
        let request = PageRequest::new(page, page_size)?;
        Ok(request.slice(&self.products).to_vec())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        InMemoryCatalog::new(iter.into_iter().collect())
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find_product(&self, product_id: ProductId) -> CartResult<Product> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or(CartError::ProductNotFound(product_id))
    }
}
