//! Domain service for platform administration.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::access::{Denied, Identity};
use crate::services::catalog_service::ShopSummary;
use crate::services::order_service::OrderDetails;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Please sign in first")]
    Unauthorized,

    #[error("Administrators only")]
    Forbidden,

    /// The request is well-formed and authorized but not allowed on this target.
    #[error("{0}")]
    ForbiddenOperation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<Denied> for AdminError {
    fn from(denied: Denied) -> Self {
        match denied {
            Denied::Unauthorized => Self::Unauthorized,
            Denied::Forbidden => Self::Forbidden,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_orders: u64,
    /// Accounts in the consumer role only.
    pub total_users: u64,
    pub total_shops: u64,
}

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub stats: PlatformStats,
    pub shops: Vec<ShopSummary>,
    pub users: Vec<User>,
    pub recent_orders: Vec<OrderDetails>,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    /// Platform overview with the `recent_limit` newest orders.
    async fn dashboard(
        &self,
        identity: &Identity,
        recent_limit: u64,
    ) -> Result<AdminDashboard, AdminError>;

    /// Deletes a shop with its orders and foods. Returns the rows removed.
    async fn delete_shop(&self, identity: &Identity, shop_id: i32) -> Result<usize, AdminError>;

    /// Deletes a user with their orders and owned shop. Returns the rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::ForbiddenOperation`] when the target is the caller
    /// or another administrator.
    async fn delete_user(&self, identity: &Identity, user_id: i32) -> Result<usize, AdminError>;
}
