//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{FoodChanges, NewFood, Store};
use crate::domain::access::{Capability, Identity, require};
use crate::domain::inventory;
use crate::entities::{Role, foods, shops};
use crate::services::catalog_service::{
    CatalogError, CatalogService, ShopDashboard, ShopDetail, ShopSummary,
};
use crate::services::order_service_impl::order_details;

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// The shop the caller manages, or an error if they manage none.
    async fn own_shop(&self, identity: &Identity) -> Result<shops::Model, CatalogError> {
        require(Some(identity), Capability::Role(Role::Shop))?;

        let shop_id = identity
            .owned_shop()
            .ok_or_else(|| CatalogError::NotFound("Shop for this account".to_string()))?;

        self.store
            .shops()
            .get(shop_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Shop {shop_id}")))
    }

    async fn find_food(&self, food_id: i32) -> Result<foods::Model, CatalogError> {
        self.store
            .foods()
            .get(food_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Food {food_id}")))
    }
}

fn validate_listing(name: &str, quantity: i32) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("Food name is required".to_string()));
    }
    if quantity < 0 {
        return Err(CatalogError::Validation("Quantity cannot be negative".to_string()));
    }
    Ok(())
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_shops(&self) -> Result<Vec<ShopSummary>, CatalogError> {
        let shops = self.store.shops().list_all().await?;
        let ids: Vec<i32> = shops.iter().map(|s| s.id).collect();
        let totals = self.store.shops().available_quantities(&ids).await?;

        Ok(shops
            .into_iter()
            .map(|shop| ShopSummary {
                available_quantity: totals.get(&shop.id).copied().unwrap_or(0),
                shop,
            })
            .collect())
    }

    async fn shop_detail(&self, shop_id: i32) -> Result<ShopDetail, CatalogError> {
        let shop = self
            .store
            .shops()
            .get(shop_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Shop {shop_id}")))?;

        let foods = self.store.foods().list_active_for_shop(shop_id).await?;
        let available_quantity = inventory::available_quantity(&foods);

        Ok(ShopDetail {
            summary: ShopSummary {
                shop,
                available_quantity,
            },
            foods,
        })
    }

    async fn dashboard(&self, identity: &Identity) -> Result<ShopDashboard, CatalogError> {
        let shop = self.own_shop(identity).await?;
        let foods = self.store.foods().list_for_shop(shop.id).await?;
        let orders = self.store.orders().list_for_shop(shop.id).await?;
        let orders = order_details(&self.store, orders).await?;

        Ok(ShopDashboard {
            shop,
            foods,
            orders,
        })
    }

    async fn create_food(
        &self,
        identity: &Identity,
        food: NewFood,
    ) -> Result<foods::Model, CatalogError> {
        let shop = self.own_shop(identity).await?;
        validate_listing(&food.name, food.quantity)?;

        Ok(self.store.foods().create(shop.id, food).await?)
    }

    async fn update_food(
        &self,
        identity: &Identity,
        food_id: i32,
        changes: FoodChanges,
    ) -> Result<foods::Model, CatalogError> {
        let food = self.find_food(food_id).await?;
        require(
            Some(identity),
            Capability::ManageShop {
                shop_id: food.shop_id,
            },
        )?;
        validate_listing(&changes.name, changes.quantity)?;

        let updated = self
            .store
            .foods()
            .update(food_id, changes)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Food {food_id}")))?;

        info!(
            food_id,
            quantity = updated.quantity,
            is_active = updated.is_active,
            "Updated food listing"
        );
        Ok(updated)
    }

    async fn delete_food(&self, identity: &Identity, food_id: i32) -> Result<(), CatalogError> {
        let food = self.find_food(food_id).await?;
        require(
            Some(identity),
            Capability::ManageShop {
                shop_id: food.shop_id,
            },
        )?;

        if !self.store.foods().delete(food_id).await? {
            return Err(CatalogError::NotFound(format!("Food {food_id}")));
        }
        Ok(())
    }
}
