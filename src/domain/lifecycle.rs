//! Order status transitions.
//!
//! `pending` is the initial state. `completed` cannot be cancelled by the
//! buyer. `cancelled` is terminal, but re-asserting it is allowed and does
//! nothing to stock.

use crate::entities::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("A completed pickup cannot be cancelled")]
    CompletedCannotCancel,

    #[error("Cannot update a cancelled order to {0}")]
    CancelledIsFinal(OrderStatus),

    #[error("Invalid order status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedAt {
    /// Stamp with the current time.
    Stamp,
    Clear,
}

/// A decided status change, applied by the caller in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Return every booked quantity to its food.
    pub restock: bool,
    pub completed_at: CompletedAt,
}

impl Transition {
    fn to_target(from: OrderStatus, to: OrderStatus) -> Self {
        Self {
            from,
            to,
            restock: to == OrderStatus::Cancelled && from != OrderStatus::Cancelled,
            completed_at: if to == OrderStatus::Completed {
                CompletedAt::Stamp
            } else {
                CompletedAt::Clear
            },
        }
    }
}

/// Cancellation requested by the buyer, the shop, or an admin.
///
/// `Ok(None)` means the order is already cancelled: report success, change nothing.
pub fn plan_cancel(current: OrderStatus) -> Result<Option<Transition>, LifecycleError> {
    match current {
        OrderStatus::Completed => Err(LifecycleError::CompletedCannotCancel),
        OrderStatus::Cancelled => Ok(None),
        OrderStatus::Pending => Ok(Some(Transition::to_target(
            current,
            OrderStatus::Cancelled,
        ))),
    }
}

/// Status change requested from the shop dashboard.
pub fn plan_status_update(
    current: OrderStatus,
    requested: &str,
) -> Result<Transition, LifecycleError> {
    let target: OrderStatus = requested
        .trim()
        .parse()
        .map_err(|_| LifecycleError::UnknownStatus(requested.to_string()))?;

    if current == OrderStatus::Cancelled && target != OrderStatus::Cancelled {
        return Err(LifecycleError::CancelledIsFinal(target));
    }

    Ok(Transition::to_target(current, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_pending_restocks_and_clears_completion() {
        let t = plan_cancel(OrderStatus::Pending).unwrap().unwrap();
        assert_eq!(t.to, OrderStatus::Cancelled);
        assert!(t.restock);
        assert_eq!(t.completed_at, CompletedAt::Clear);
    }

    #[test]
    fn cancel_completed_is_rejected() {
        assert_eq!(
            plan_cancel(OrderStatus::Completed),
            Err(LifecycleError::CompletedCannotCancel)
        );
    }

    #[test]
    fn cancel_cancelled_is_a_noop() {
        assert_eq!(plan_cancel(OrderStatus::Cancelled), Ok(None));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            plan_status_update(OrderStatus::Pending, "shipped"),
            Err(LifecycleError::UnknownStatus("shipped".to_string()))
        );
    }

    #[test]
    fn completing_stamps_completed_at() {
        let t = plan_status_update(OrderStatus::Pending, "completed").unwrap();
        assert_eq!(t.to, OrderStatus::Completed);
        assert!(!t.restock);
        assert_eq!(t.completed_at, CompletedAt::Stamp);
    }

    #[test]
    fn reopening_a_completed_order_clears_completed_at() {
        let t = plan_status_update(OrderStatus::Completed, "pending").unwrap();
        assert_eq!(t.to, OrderStatus::Pending);
        assert_eq!(t.completed_at, CompletedAt::Clear);
    }

    #[test]
    fn shop_cancel_of_completed_order_restocks() {
        let t = plan_status_update(OrderStatus::Completed, "cancelled").unwrap();
        assert!(t.restock);
    }

    #[test]
    fn cancelled_orders_only_accept_cancelled() {
        assert_eq!(
            plan_status_update(OrderStatus::Cancelled, "pending"),
            Err(LifecycleError::CancelledIsFinal(OrderStatus::Pending))
        );

        let t = plan_status_update(OrderStatus::Cancelled, "cancelled").unwrap();
        assert!(!t.restock);
        assert_eq!(t.completed_at, CompletedAt::Clear);
    }
}
