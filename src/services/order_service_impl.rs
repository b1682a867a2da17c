//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::db::Store;
use crate::domain::OrderId;
use crate::domain::access::{Capability, Identity, require};
use crate::domain::cart::{Cart, CartError, FoodSnapshot};
use crate::domain::inventory::{self, Booking};
use crate::domain::lifecycle::{self, CompletedAt, Transition};
use crate::domain::pickup;
use crate::entities::{OrderStatus, foods, order_items, orders, shops};
use crate::services::order_service::{
    CancelOutcome, Cancellation, CartContents, CartLine, OrderDetails, OrderError, OrderService,
};

/// Re-reads allowed when another writer changes a food's stock mid-checkout.
const MAX_BOOKING_ATTEMPTS: usize = 3;

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find_order(&self, order_id: OrderId) -> Result<orders::Model, OrderError> {
        self.store
            .orders()
            .get(order_id.value())
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {order_id}")))
    }

    /// Loads the cart's foods and drops lines whose food no longer exists.
    async fn prune_cart(&self, cart: &mut Cart) -> Result<HashMap<i32, foods::Model>, OrderError> {
        let ids: Vec<i32> = cart.lines().map(|(id, _)| id).collect();
        let foods = self.store.foods().get_many(&ids).await?;

        let dropped = cart.retain(|id| foods.contains_key(&id));
        if dropped > 0 {
            debug!(dropped, "Dropped deleted foods from cart");
        }
        Ok(foods)
    }

    async fn details_of(&self, order: orders::Model) -> Result<OrderDetails, OrderError> {
        let id = order.id;
        order_details(&self.store, vec![order])
            .await?
            .pop()
            .ok_or_else(|| OrderError::NotFound(format!("Order {id}")))
    }
}

/// Attaches shop names and line items to a batch of orders, keeping their order.
pub(crate) async fn order_details(
    store: &Store,
    orders: Vec<orders::Model>,
) -> anyhow::Result<Vec<OrderDetails>> {
    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut lines = store.orders().lines_for(&order_ids).await?;

    let shop_ids: Vec<i32> = orders.iter().map(|o| o.shop_id).collect();
    let shop_names: HashMap<i32, String> = if shop_ids.is_empty() {
        HashMap::new()
    } else {
        shops::Entity::find()
            .filter(shops::Column::Id.is_in(shop_ids))
            .all(&store.conn)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect()
    };

    Ok(orders
        .into_iter()
        .map(|order| OrderDetails {
            shop_name: shop_names.get(&order.shop_id).cloned(),
            lines: lines.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

/// Books one cart line against live stock with a conditional decrement.
///
/// Returns `None` when the food is gone or no longer belongs to `shop_id`.
async fn book_line<C: ConnectionTrait>(
    conn: &C,
    shop_id: i32,
    food_id: i32,
    requested: i32,
) -> Result<Option<Booking>, OrderError> {
    for _ in 0..MAX_BOOKING_ATTEMPTS {
        let Some(food) = foods::Entity::find_by_id(food_id).one(conn).await? else {
            return Ok(None);
        };
        if food.shop_id != shop_id {
            return Ok(None);
        }

        let booking = inventory::book(food.quantity, requested);
        if booking.booked == 0 {
            return Ok(Some(booking));
        }

        let result = foods::Entity::update_many()
            .col_expr(
                foods::Column::Quantity,
                Expr::col(foods::Column::Quantity).sub(booking.booked),
            )
            .filter(foods::Column::Id.eq(food_id))
            .filter(foods::Column::Quantity.gte(booking.booked))
            .exec(conn)
            .await?;

        if result.rows_affected == 1 {
            return Ok(Some(booking));
        }

        debug!(food_id, "Stock changed during checkout, re-reading");
    }

    Err(OrderError::Internal(format!(
        "Stock for food {food_id} kept changing during checkout"
    )))
}

/// Applies a planned transition: restock if asked, then status and `completed_at`.
async fn apply_transition<C: ConnectionTrait>(
    conn: &C,
    order: orders::Model,
    transition: Transition,
) -> Result<orders::Model, OrderError> {
    if transition.restock {
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(conn)
            .await?;

        for item in items.iter().filter(|i| i.quantity > 0) {
            let result = foods::Entity::update_many()
                .col_expr(
                    foods::Column::Quantity,
                    Expr::col(foods::Column::Quantity).add(item.quantity),
                )
                .filter(foods::Column::Id.eq(item.food_id))
                .exec(conn)
                .await?;

            if result.rows_affected == 0 {
                debug!(
                    order_id = order.id,
                    food_id = item.food_id,
                    "Food no longer exists, nothing to restock"
                );
            }
        }
    }

    let mut active: orders::ActiveModel = order.into();
    active.status = Set(transition.to);
    active.completed_at = Set(match transition.completed_at {
        CompletedAt::Stamp => Some(Utc::now()),
        CompletedAt::Clear => None,
    });

    Ok(active.update(conn).await?)
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn cart_contents(&self, cart: &mut Cart) -> Result<CartContents, OrderError> {
        if cart.is_empty() {
            return Ok(CartContents::default());
        }

        let mut foods = self.prune_cart(cart).await?;

        let shop = match cart.shop_id {
            Some(shop_id) => self.store.shops().get(shop_id).await?,
            None => None,
        };

        let lines = cart
            .lines()
            .filter_map(|(id, quantity)| foods.remove(&id).map(|food| CartLine { food, quantity }))
            .collect();

        Ok(CartContents { shop, lines })
    }

    async fn add_to_cart(
        &self,
        cart: &mut Cart,
        food_id: i32,
        quantity: i32,
    ) -> Result<i32, OrderError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity.into());
        }

        let food = self
            .store
            .foods()
            .get(food_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Food {food_id}")))?;

        if !food.is_active {
            return Err(OrderError::Validation(format!(
                "{} is no longer offered",
                food.name
            )));
        }

        self.prune_cart(cart).await?;

        let snapshot = FoodSnapshot {
            id: food.id,
            shop_id: food.shop_id,
            name: food.name,
            quantity: food.quantity,
        };
        let held = cart.add(&snapshot, quantity)?;

        debug!(food_id, requested = quantity, held, "Added to cart");
        Ok(held)
    }

    async fn checkout(
        &self,
        identity: &Identity,
        cart: &Cart,
        pickup: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<OrderId, OrderError> {
        require(Some(identity), Capability::Authenticated)?;

        let shop_id = match cart.shop_id {
            Some(id) if !cart.is_empty() => id,
            _ => return Err(OrderError::Validation("Your cart is empty".to_string())),
        };

        let shop = self
            .store
            .shops()
            .get(shop_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Shop {shop_id}")))?;

        let pickup_time = pickup::resolve_pickup(pickup, now, shop.closing_time)?;

        let txn = self.store.conn.begin().await?;

        let order = orders::ActiveModel {
            user_id: Set(identity.user_id),
            shop_id: Set(shop.id),
            pickup_time: Set(pickup_time),
            status: Set(OrderStatus::Pending),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut short_lines = 0u64;
        for (food_id, requested) in cart.lines() {
            let Some(booking) = book_line(&txn, shop.id, food_id, requested).await? else {
                debug!(order_id = order.id, food_id, "Skipping food that no longer exists");
                continue;
            };

            if booking.is_short() {
                short_lines += 1;
                warn!(
                    order_id = order.id,
                    food_id,
                    requested = booking.requested,
                    booked = booking.booked,
                    "Booked less than requested"
                );
            }

            order_items::ActiveModel {
                order_id: Set(order.id),
                food_id: Set(food_id),
                quantity: Set(booking.booked),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        metrics::counter!("orders_created_total").increment(1);
        if short_lines > 0 {
            metrics::counter!("order_items_short_booked_total").increment(short_lines);
        }

        info!(
            order_id = order.id,
            user_id = identity.user_id,
            shop_id = shop.id,
            pickup_time = %pickup_time,
            "Order placed"
        );

        Ok(OrderId::new(order.id))
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderDetails>, OrderError> {
        let orders = self.store.orders().list_for_user(identity.user_id).await?;
        Ok(order_details(&self.store, orders).await?)
    }

    async fn get_order(
        &self,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<OrderDetails, OrderError> {
        let order = self.find_order(order_id).await?;
        require(
            Some(identity),
            Capability::ViewOrder {
                buyer_id: order.user_id,
            },
        )?;

        self.details_of(order).await
    }

    async fn cancel(
        &self,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<Cancellation, OrderError> {
        let txn = self.store.conn.begin().await?;

        let order = orders::Entity::find_by_id(order_id.value())
            .one(&txn)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {order_id}")))?;

        require(
            Some(identity),
            Capability::CancelOrder {
                buyer_id: order.user_id,
                shop_id: order.shop_id,
            },
        )?;

        let (outcome, order) = match lifecycle::plan_cancel(order.status)? {
            Some(transition) => (
                CancelOutcome::Cancelled,
                apply_transition(&txn, order, transition).await?,
            ),
            None => (CancelOutcome::AlreadyCancelled, order),
        };
        txn.commit().await?;

        if outcome == CancelOutcome::Cancelled {
            metrics::counter!("orders_cancelled_total").increment(1);
            info!(
                order_id = order.id,
                by_user = identity.user_id,
                "Order cancelled"
            );
        } else {
            debug!(order_id = order.id, "Order already cancelled");
        }

        Ok(Cancellation {
            outcome,
            order: self.details_of(order).await?,
        })
    }

    async fn update_status(
        &self,
        identity: &Identity,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderDetails, OrderError> {
        let txn = self.store.conn.begin().await?;

        let order = orders::Entity::find_by_id(order_id.value())
            .one(&txn)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {order_id}")))?;

        require(
            Some(identity),
            Capability::ManageOrder {
                shop_id: order.shop_id,
            },
        )?;

        let transition = lifecycle::plan_status_update(order.status, status)?;
        let updated = apply_transition(&txn, order, transition).await?;
        txn.commit().await?;

        if transition.restock {
            metrics::counter!("orders_cancelled_total").increment(1);
        }
        info!(
            order_id = updated.id,
            from = %transition.from,
            to = %transition.to,
            "Order status updated"
        );

        self.details_of(updated).await
    }
}
