use anyhow::{Context, Result};
use chrono::NaiveTime;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

use crate::domain::inventory;
use crate::entities::{foods, shops};

#[derive(Debug, Clone, Default)]
pub struct NewShop {
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub rating: f64,
}

pub struct ShopRepository {
    conn: DatabaseConnection,
}

impl ShopRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<shops::Model>> {
        shops::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query shop")
    }

    pub async fn get_by_owner(&self, owner_id: i32) -> Result<Option<shops::Model>> {
        shops::Entity::find()
            .filter(shops::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query shop by owner")
    }

    pub async fn list_all(&self) -> Result<Vec<shops::Model>> {
        let rows = shops::Entity::find()
            .order_by_asc(shops::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(shops::Entity::find().count(&self.conn).await?)
    }

    pub async fn manager_email_exists(&self, email: &str) -> Result<bool> {
        let count = shops::Entity::find()
            .filter(shops::Column::ManagerEmail.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check shop email uniqueness")?;
        Ok(count > 0)
    }

    /// Derived `available_quantity` per shop: stock summed over active foods.
    ///
    /// Shops without active foods map to 0.
    pub async fn available_quantities(&self, shop_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if shop_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let active = foods::Entity::find()
            .filter(foods::Column::ShopId.is_in(shop_ids.iter().copied()))
            .filter(foods::Column::IsActive.eq(true))
            .all(&self.conn)
            .await
            .context("Failed to load foods for availability")?;

        let mut by_shop: HashMap<i32, Vec<foods::Model>> = HashMap::new();
        for food in active {
            by_shop.entry(food.shop_id).or_default().push(food);
        }

        Ok(shop_ids
            .iter()
            .map(|id| {
                let total = by_shop
                    .get(id)
                    .map_or(0, |list| inventory::available_quantity(list));
                (*id, total)
            })
            .collect())
    }
}
