//! # Quantity
//!
//! The count of one product in a cart line.
//!
//! ## Floor Rule
//! ```text
//!   count:   1 ──increment──► 2 ──increment──► 3
//!            ▲                                 │
//!            └──────────decrement──────────────┘ (stops at 1)
//!
//!   At 1 the caller decides: delete the line instead of decrementing.
//! ```
//!
//! A `Quantity` of zero cannot be built, so a cart line with nothing in it
//! is unrepresentable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CartError, CartResult, ValidationError};

/// A positive item count (`count >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// The floor every quantity respects.
    pub const MIN: Quantity = Quantity(1);

    /// Creates a quantity, rejecting zero.
    pub fn new(count: u32) -> CartResult<Self> {
        if count == 0 {
            return Err(CartError::InvalidArgument(ValidationError::must_be_positive(
                "quantity",
            )));
        }
        Ok(Quantity(count))
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0
    }

    /// True when a decrement would cross the floor.
    #[inline]
    pub const fn is_at_minimum(&self) -> bool {
        self.0 == Self::MIN.0
    }

    /// Returns `count + 1`, or `OutOfRange` at `u32::MAX`.
    pub fn increment(self) -> CartResult<Self> {
        self.0.checked_add(1).map(Quantity).ok_or_else(|| {
            CartError::InvalidArgument(ValidationError::OutOfRange {
                field: "quantity".into(),
                min: 1,
                max: i64::from(u32::MAX),
            })
        })
    }

    /// Returns `max(count - 1, 1)`.
    ///
    /// Callers that must distinguish "decremented" from "already at the
    /// floor" check [`Quantity::is_at_minimum`] first, or use
    /// [`Quantity::checked_decrement`].
    #[must_use]
    pub const fn decrement(self) -> Self {
        if self.is_at_minimum() {
            self
        } else {
            Quantity(self.0 - 1)
        }
    }

    /// Returns `count - 1`, or `None` at the floor.
    pub const fn checked_decrement(self) -> Option<Self> {
        if self.is_at_minimum() {
            None
        } else {
            Some(Quantity(self.0 - 1))
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CartError;

    fn try_from(count: u32) -> CartResult<Self> {
        Quantity::new(count)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zero_is_rejected() {
        let err = Quantity::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_increment_and_decrement() {
        let q = Quantity::new(2).unwrap();
        assert_eq!(q.increment().unwrap().count(), 3);
        assert_eq!(q.decrement().count(), 1);
        assert_eq!(q.count(), 2); // value semantics
    }

    #[test]
    fn test_increment_at_ceiling() {
        let top = Quantity::new(u32::MAX).unwrap();
        let err = top.increment().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(top.count(), u32::MAX);
    }

    #[test]
    fn test_floor() {
        assert!(Quantity::MIN.is_at_minimum());
        assert_eq!(Quantity::MIN.decrement(), Quantity::MIN);
        assert_eq!(Quantity::MIN.checked_decrement(), None);
        assert_eq!(
            Quantity::new(5).unwrap().checked_decrement(),
            Some(Quantity::new(4).unwrap())
        );
    }

    #[test]
    fn test_ordering_by_count() {
        assert!(Quantity::new(3).unwrap() > Quantity::new(2).unwrap());
        assert_eq!(Quantity::default(), Quantity::MIN);
    }

    #[test]
    fn test_serde_rejects_zero() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.count(), 4);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
