use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::cascade::{Node, OwnershipTree};
use crate::entities::{foods, order_items, orders, shops, users};

/// Executes ownership-tree deletes inside one transaction.
pub struct CascadeRepository {
    conn: DatabaseConnection,
}

impl CascadeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Deletes a shop with its orders, order items and foods.
    ///
    /// Returns the number of rows removed, or `None` if the shop does not exist.
    pub async fn delete_shop(&self, shop_id: i32) -> Result<Option<usize>> {
        let txn = self.conn.begin().await?;

        if shops::Entity::find_by_id(shop_id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let tree = shop_tree(&txn, shop_id).await?;
        let removed = execute(&txn, &tree.deletion_plan()).await?;

        txn.commit().await?;
        info!(shop_id, removed, "Deleted shop with dependents");
        Ok(Some(removed))
    }

    /// Deletes a user with the orders they placed and the shop they own.
    ///
    /// Returns the number of rows removed, or `None` if the user does not exist.
    pub async fn delete_user(&self, user_id: i32) -> Result<Option<usize>> {
        let txn = self.conn.begin().await?;

        if users::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let order_ids: Vec<i32> = orders::Entity::find()
            .select_only()
            .column(orders::Column::Id)
            .filter(orders::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&txn)
            .await
            .context("Failed to load user orders")?;
        let own_orders = order_trees(&txn, &order_ids).await?;

        let shop = shops::Entity::find()
            .filter(shops::Column::OwnerId.eq(user_id))
            .one(&txn)
            .await?;
        let shop_tree = match shop {
            Some(shop) => Some(shop_tree(&txn, shop.id).await?),
            None => None,
        };

        let tree = OwnershipTree::user(user_id, own_orders, shop_tree);
        let removed = execute(&txn, &tree.deletion_plan()).await?;

        txn.commit().await?;
        info!(user_id, removed, "Deleted user with dependents");
        Ok(Some(removed))
    }
}

async fn order_trees<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[i32],
) -> Result<Vec<OwnershipTree>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<(i32, i32)> = order_items::Entity::find()
        .select_only()
        .column(order_items::Column::Id)
        .column(order_items::Column::OrderId)
        .filter(order_items::Column::OrderId.is_in(order_ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await
        .context("Failed to load order items for cascade")?;

    let mut by_order: HashMap<i32, Vec<i32>> = HashMap::new();
    for (item_id, order_id) in items {
        by_order.entry(order_id).or_default().push(item_id);
    }

    Ok(order_ids
        .iter()
        .map(|id| OwnershipTree::order(*id, by_order.remove(id).unwrap_or_default()))
        .collect())
}

async fn shop_tree<C: ConnectionTrait>(conn: &C, shop_id: i32) -> Result<OwnershipTree> {
    let order_ids: Vec<i32> = orders::Entity::find()
        .select_only()
        .column(orders::Column::Id)
        .filter(orders::Column::ShopId.eq(shop_id))
        .into_tuple()
        .all(conn)
        .await
        .context("Failed to load shop orders")?;

    let food_ids: Vec<i32> = foods::Entity::find()
        .select_only()
        .column(foods::Column::Id)
        .filter(foods::Column::ShopId.eq(shop_id))
        .into_tuple()
        .all(conn)
        .await
        .context("Failed to load shop foods")?;

    let orders = order_trees(conn, &order_ids).await?;
    Ok(OwnershipTree::shop(shop_id, orders, food_ids))
}

async fn execute<C: ConnectionTrait>(conn: &C, plan: &[Node]) -> Result<usize> {
    let mut removed = 0usize;

    for node in plan {
        let result = match *node {
            Node::OrderItem(id) => order_items::Entity::delete_by_id(id).exec(conn).await,
            Node::Order(id) => orders::Entity::delete_by_id(id).exec(conn).await,
            Node::Food(id) => foods::Entity::delete_by_id(id).exec(conn).await,
            Node::Shop(id) => shops::Entity::delete_by_id(id).exec(conn).await,
            Node::User(id) => users::Entity::delete_by_id(id).exec(conn).await,
        }
        .with_context(|| format!("Failed to delete {node:?}"))?;

        debug!(?node, rows = result.rows_affected, "Cascade delete");
        removed += usize::try_from(result.rows_affected).unwrap_or(usize::MAX);
    }

    Ok(removed)
}
