use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{foods, order_items, orders};

/// An order item joined with what is left of its food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub item_id: i32,
    pub food_id: i32,
    /// `None` once the food has been deleted from the catalog.
    pub food_name: Option<String>,
    pub photo_url: Option<String>,
    pub quantity: i32,
}

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<orders::Model>> {
        orders::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query order")
    }

    /// Line items for several orders at once, grouped by order id.
    pub async fn lines_for(&self, order_ids: &[i32]) -> Result<HashMap<i32, Vec<OrderLine>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids.iter().copied()))
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load order items")?;

        let food_ids: Vec<i32> = items.iter().map(|i| i.food_id).collect();
        let foods: HashMap<i32, foods::Model> = foods::Entity::find()
            .filter(foods::Column::Id.is_in(food_ids))
            .all(&self.conn)
            .await
            .context("Failed to load foods for order items")?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let mut grouped: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for item in items {
            let food = foods.get(&item.food_id);
            grouped.entry(item.order_id).or_default().push(OrderLine {
                item_id: item.id,
                food_id: item.food_id,
                food_name: food.map(|f| f.name.clone()),
                photo_url: food.and_then(|f| f.photo_url.clone()),
                quantity: item.quantity,
            });
        }

        Ok(grouped)
    }

    /// A buyer's orders, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<orders::Model>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// A shop's orders, newest first.
    pub async fn list_for_shop(&self, shop_id: i32) -> Result<Vec<orders::Model>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::ShopId.eq(shop_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<orders::Model>> {
        let rows = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(orders::Entity::find().count(&self.conn).await?)
    }
}
