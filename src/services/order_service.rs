//! Domain service for the cart, checkout and order lifecycle.
//!
//! Every mutating operation runs in a single database transaction; a failure
//! anywhere leaves stock and orders exactly as they were.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::db::OrderLine;
use crate::domain::OrderId;
use crate::domain::access::{Denied, Identity};
use crate::domain::cart::{Cart, CartError};
use crate::domain::lifecycle::LifecycleError;
use crate::domain::pickup::PickupError;
use crate::entities::{foods, orders, shops};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PickupTime(String),

    #[error("{0}")]
    CartConflict(String),

    #[error("Please sign in first")]
    Unauthorized,

    #[error("You do not have access to this order")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<Denied> for OrderError {
    fn from(denied: Denied) -> Self {
        match denied {
            Denied::Unauthorized => Self::Unauthorized,
            Denied::Forbidden => Self::Forbidden,
        }
    }
}

impl From<CartError> for OrderError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Conflict { .. } => Self::CartConflict(err.to_string()),
            CartError::InvalidQuantity | CartError::SoldOut(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<PickupError> for OrderError {
    fn from(err: PickupError) -> Self {
        if err.is_input_error() {
            Self::Validation(err.to_string())
        } else {
            Self::PickupTime(err.to_string())
        }
    }
}

impl From<LifecycleError> for OrderError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::UnknownStatus(_) => Self::InvalidStatus(err.to_string()),
            LifecycleError::CompletedCannotCancel | LifecycleError::CancelledIsFinal(_) => {
                Self::InvalidTransition(err.to_string())
            }
        }
    }
}

/// A cart line joined with its food.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub food: foods::Model,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CartContents {
    pub shop: Option<shops::Model>,
    pub lines: Vec<CartLine>,
}

/// An order with its shop name and booked lines.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: orders::Model,
    pub shop_name: Option<String>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled,
    /// The order was cancelled before; nothing changed.
    AlreadyCancelled,
}

#[derive(Debug, Clone)]
pub struct Cancellation {
    pub outcome: CancelOutcome,
    pub order: OrderDetails,
}

#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Resolves the foods referenced by a cart.
    ///
    /// Lines whose food has been deleted are dropped from `cart`; the caller
    /// writes the cart back.
    async fn cart_contents(&self, cart: &mut Cart) -> Result<CartContents, OrderError>;

    /// Adds a food to the cart, returning the quantity now held.
    ///
    /// Lines whose food has been deleted are dropped first, so a cart left
    /// behind by a removed shop does not block other shops.
    ///
    /// # Errors
    ///
    /// - [`OrderError::CartConflict`] if the cart holds another shop's food
    /// - [`OrderError::Validation`] for a non-positive quantity, or a food that
    ///   is inactive or sold out
    async fn add_to_cart(
        &self,
        cart: &mut Cart,
        food_id: i32,
        quantity: i32,
    ) -> Result<i32, OrderError>;

    /// Converts the cart into a pending order and decrements stock.
    ///
    /// `pickup` is a time of day on `now`'s date. The caller clears the cart
    /// once this returns `Ok`.
    async fn checkout(
        &self,
        identity: &Identity,
        cart: &Cart,
        pickup: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<OrderId, OrderError>;

    /// Orders placed by the caller, newest first.
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderDetails>, OrderError>;

    async fn get_order(
        &self,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<OrderDetails, OrderError>;

    /// Cancels an order and returns its items to stock.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] for a completed order.
    async fn cancel(
        &self,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<Cancellation, OrderError>;

    /// Sets an order's status from the shop side.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidStatus`] for an unknown status
    /// - [`OrderError::InvalidTransition`] when leaving `cancelled`
    async fn update_status(
        &self,
        identity: &Identity,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderDetails, OrderError>;
}

