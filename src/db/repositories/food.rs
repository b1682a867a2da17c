use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::info;

use crate::entities::foods;

#[derive(Debug, Clone, Default)]
pub struct NewFood {
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub expiry_time: Option<NaiveDateTime>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
}

/// Full replacement of the editable fields, as submitted by the edit form.
#[derive(Debug, Clone, Default)]
pub struct FoodChanges {
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub expiry_time: Option<NaiveDateTime>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

pub struct FoodRepository {
    conn: DatabaseConnection,
}

impl FoodRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<foods::Model>> {
        foods::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query food")
    }

    /// Foods keyed by id. Ids that no longer exist are simply absent.
    pub async fn get_many(&self, ids: &[i32]) -> Result<HashMap<i32, foods::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = foods::Entity::find()
            .filter(foods::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|f| (f.id, f)).collect())
    }

    /// Storefront listing: active foods only.
    pub async fn list_active_for_shop(&self, shop_id: i32) -> Result<Vec<foods::Model>> {
        let rows = foods::Entity::find()
            .filter(foods::Column::ShopId.eq(shop_id))
            .filter(foods::Column::IsActive.eq(true))
            .order_by_asc(foods::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Dashboard listing: every food, newest first.
    pub async fn list_for_shop(&self, shop_id: i32) -> Result<Vec<foods::Model>> {
        let rows = foods::Entity::find()
            .filter(foods::Column::ShopId.eq(shop_id))
            .order_by_desc(foods::Column::CreatedAt)
            .order_by_desc(foods::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, shop_id: i32, food: NewFood) -> Result<foods::Model> {
        let model = foods::ActiveModel {
            shop_id: Set(shop_id),
            name: Set(food.name),
            category: Set(food.category),
            quantity: Set(food.quantity.max(0)),
            expiry_time: Set(food.expiry_time),
            photo_url: Set(food.photo_url),
            description: Set(food.description),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert food")?;

        info!(food_id = model.id, shop_id, "Created food listing");
        Ok(model)
    }

    pub async fn update(&self, id: i32, changes: FoodChanges) -> Result<Option<foods::Model>> {
        let Some(food) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: foods::ActiveModel = food.into();
        active.name = Set(changes.name);
        active.category = Set(changes.category);
        active.quantity = Set(changes.quantity.max(0));
        active.expiry_time = Set(changes.expiry_time);
        active.photo_url = Set(changes.photo_url);
        active.description = Set(changes.description);
        active.is_active = Set(changes.is_active);

        let updated = active.update(&self.conn).await?;
        Ok(Some(updated))
    }

    /// Removes a listing. Past order items keep their dangling `food_id`.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = foods::Entity::delete_by_id(id).exec(&self.conn).await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(food_id = id, "Deleted food listing");
        }
        Ok(removed)
    }
}
