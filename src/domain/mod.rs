//! Domain rules for the pickup marketplace.
//!
//! Everything in here is free of I/O: the session cart, authorization,
//! pickup-window validation, order status transitions and the deletion
//! ownership tree. Services load rows, consult these rules, and persist
//! the outcome inside a single transaction.

pub mod access;
pub mod cart;
pub mod cascade;
pub mod inventory;
pub mod lifecycle;
pub mod pickup;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted order.
///
/// Returned by checkout so the caller can redirect to a confirmation view.
///
/// # Examples
///
/// ```rust
/// use foodloop::domain::OrderId;
///
/// let id = OrderId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i32);

impl OrderId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "OrderId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<OrderId> for i32 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl From<i32> for OrderId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&OrderId::new(12)).unwrap();
        assert_eq!(json, "12");

        let back: OrderId = serde_json::from_str("12").unwrap();
        assert_eq!(back, OrderId::new(12));
    }
}
