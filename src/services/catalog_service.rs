//! Domain service for browsing shops and managing a vendor's foods.

use thiserror::Error;

use crate::db::{FoodChanges, NewFood};
use crate::domain::access::{Denied, Identity};
use crate::entities::{foods, shops};
use crate::services::order_service::OrderDetails;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Please sign in first")]
    Unauthorized,

    #[error("Only the shop's own account can do that")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<Denied> for CatalogError {
    fn from(denied: Denied) -> Self {
        match denied {
            Denied::Unauthorized => Self::Unauthorized,
            Denied::Forbidden => Self::Forbidden,
        }
    }
}

/// A shop with its derived stock total.
#[derive(Debug, Clone)]
pub struct ShopSummary {
    pub shop: shops::Model,
    /// Stock summed over active foods.
    pub available_quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ShopDetail {
    pub summary: ShopSummary,
    /// Active foods only.
    pub foods: Vec<foods::Model>,
}

#[derive(Debug, Clone)]
pub struct ShopDashboard {
    pub shop: shops::Model,
    /// Every food of the shop, newest first, inactive ones included.
    pub foods: Vec<foods::Model>,
    pub orders: Vec<OrderDetails>,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_shops(&self) -> Result<Vec<ShopSummary>, CatalogError>;

    async fn shop_detail(&self, shop_id: i32) -> Result<ShopDetail, CatalogError>;

    /// The caller's own shop with its foods and orders.
    async fn dashboard(&self, identity: &Identity) -> Result<ShopDashboard, CatalogError>;

    async fn create_food(
        &self,
        identity: &Identity,
        food: NewFood,
    ) -> Result<foods::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] unless the food belongs to the caller's shop.
    async fn update_food(
        &self,
        identity: &Identity,
        food_id: i32,
        changes: FoodChanges,
    ) -> Result<foods::Model, CatalogError>;

    /// Removes a food. Past order items keep their (now dangling) food id.
    async fn delete_food(&self, identity: &Identity, food_id: i32) -> Result<(), CatalogError>;
}
