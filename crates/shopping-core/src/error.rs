//! # Error Types
//!
//! Domain-specific error types for shopping-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopping-core errors (this file)                                      │
//! │  ├── CartError        - Every CartStore / catalog failure              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopping-db errors (separate crate)                                   │
//! │  └── DbError          - Database failures, folded into CartError       │
//! │                                                                         │
//! │  Flow: ValidationError → CartError ← DbError                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! Consumers only need to know which *kind* of failure happened:
//!
//! | Kind              | Variants                                      |
//! |-------------------|-----------------------------------------------|
//! | `NotFound`        | `CartItemNotFound`, `ProductNotFound`         |
//! | `InvalidArgument` | `InvalidArgument`                             |
//! | `Backend`         | `Backend` (worker or database trouble)        |
//!
//! Errors are `Clone + PartialEq` so the results of two store backends can
//! be compared step by step.

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors produced by cart stores and product catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No cart line exists for the product.
    ///
    /// ## When This Occurs
    /// - `decrease_quantity` on a product that was never added
    /// - `delete_cart_item` / `find` on an absent product
    #[error("Cart item not found for product {0}")]
    CartItemNotFound(ProductId),

    /// The catalog has no product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Caller passed an argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The storage behind the store failed or is gone.
    ///
    /// ## When This Occurs
    /// - The cart worker thread stopped
    /// - A database query failed on the worker
    #[error("Backend failure: {0}")]
    Backend(String),
}

impl CartError {
    /// Creates a Backend error from any displayable message.
    pub fn backend(message: impl Into<String>) -> Self {
        CartError::Backend(message.into())
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::CartItemNotFound(_) | CartError::ProductNotFound(_) => ErrorKind::NotFound,
            CartError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CartError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Shorthand for `kind() == ErrorKind::NotFound`.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Backend,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

impl ValidationError {
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CartError::CartItemNotFound(ProductId::new(7));
        assert_eq!(err.to_string(), "Cart item not found for product 7");

        let err = CartError::InvalidArgument(ValidationError::must_be_positive("page_size"));
        assert_eq!(err.to_string(), "Invalid argument: page_size must be positive");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CartError::CartItemNotFound(ProductId::new(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CartError::ProductNotFound(ProductId::new(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CartError::backend("gone").kind(), ErrorKind::Backend);
        assert!(CartError::ProductNotFound(ProductId::new(3)).is_not_found());
    }

    #[test]
    fn test_validation_converts_to_cart_error() {
        let err: CartError = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 10,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
