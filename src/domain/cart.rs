//! Session cart.
//!
//! The cart lives in the user's session, never in the database, and never
//! reserves stock. It is a plain value: handlers load it from the session,
//! mutate it here, and write it back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The cart already holds food from another shop.
    #[error("Cart already contains items from shop {existing}; finish or clear that order first")]
    Conflict { existing: i32, requested: i32 },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("{0} is sold out")]
    SoldOut(String),
}

/// What the cart needs to know about a food when adding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodSnapshot {
    pub id: i32,
    pub shop_id: i32,
    pub name: String,
    /// Stock on hand at the time of the add.
    pub quantity: i32,
}

/// Single-shop selection of food quantities.
///
/// Serialized as `{"shop_id": 3, "items": {"12": 2}}`; JSON object keys are
/// the food ids rendered as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub shop_id: Option<i32>,
    #[serde(default)]
    pub items: BTreeMap<i32, i32>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, food_id: i32) -> i32 {
        self.items.get(&food_id).copied().unwrap_or(0)
    }

    /// Adds `quantity` of `food`, merging with what is already in the cart.
    ///
    /// The merged quantity is clamped to the food's current stock. Returns the
    /// quantity now held for that food. On error the cart is unchanged.
    pub fn add(&mut self, food: &FoodSnapshot, quantity: i32) -> Result<i32, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(existing) = self.shop_id
            && existing != food.shop_id
            && !self.items.is_empty()
        {
            return Err(CartError::Conflict {
                existing,
                requested: food.shop_id,
            });
        }

        let merged = self
            .quantity_of(food.id)
            .saturating_add(quantity)
            .min(food.quantity.max(0));
        if merged == 0 {
            return Err(CartError::SoldOut(food.name.clone()));
        }

        self.items.insert(food.id, merged);
        self.shop_id = Some(food.shop_id);
        Ok(merged)
    }

    /// Removes a food. Emptying the cart also forgets the shop.
    ///
    /// Returns whether the food was present.
    pub fn remove(&mut self, food_id: i32) -> bool {
        let removed = self.items.remove(&food_id).is_some();
        if self.items.is_empty() {
            self.clear();
        }
        removed
    }

    /// Drops every line whose food fails `keep`, e.g. foods deleted since
    /// they were added. Emptying the cart also forgets the shop.
    ///
    /// Returns the number of lines dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(i32) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|id, _| keep(*id));
        if self.items.is_empty() {
            self.clear();
        }
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.shop_id = None;
    }

    /// Lines in food-id order as `(food_id, requested_quantity)`.
    pub fn lines(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: i32, shop_id: i32, quantity: i32) -> FoodSnapshot {
        FoodSnapshot {
            id,
            shop_id,
            name: format!("Food {id}"),
            quantity,
        }
    }

    #[test]
    fn add_sets_shop_and_quantity() {
        let mut cart = Cart::default();
        let held = cart.add(&food(1, 10, 4), 2).unwrap();

        assert_eq!(held, 2);
        assert_eq!(cart.shop_id, Some(10));
        assert_eq!(cart.quantity_of(1), 2);
    }

    #[test]
    fn add_merges_and_clamps_to_stock() {
        let mut cart = Cart::default();
        cart.add(&food(1, 10, 4), 3).unwrap();
        let held = cart.add(&food(1, 10, 4), 3).unwrap();

        assert_eq!(held, 4);
        assert_eq!(cart.quantity_of(1), 4);
    }

    #[test]
    fn add_from_other_shop_conflicts_and_leaves_cart_unchanged() {
        let mut cart = Cart::default();
        cart.add(&food(1, 10, 4), 2).unwrap();
        let before = cart.clone();

        let err = cart.add(&food(2, 20, 5), 1).unwrap_err();

        assert_eq!(
            err,
            CartError::Conflict {
                existing: 10,
                requested: 20
            }
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let mut cart = Cart::default();
        assert_eq!(
            cart.add(&food(1, 10, 4), 0).unwrap_err(),
            CartError::InvalidQuantity
        );
        assert!(cart.is_empty());
        assert_eq!(cart.shop_id, None);
    }

    #[test]
    fn add_sold_out_food_is_rejected() {
        let mut cart = Cart::default();
        let err = cart.add(&food(1, 10, 0), 1).unwrap_err();
        assert!(matches!(err, CartError::SoldOut(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn removing_last_item_clears_shop() {
        let mut cart = Cart::default();
        cart.add(&food(1, 10, 4), 1).unwrap();
        cart.add(&food(2, 10, 4), 1).unwrap();

        assert!(cart.remove(1));
        assert_eq!(cart.shop_id, Some(10));

        assert!(cart.remove(2));
        assert_eq!(cart, Cart::default());
    }

    #[test]
    fn removing_missing_item_is_harmless() {
        let mut cart = Cart::default();
        assert!(!cart.remove(99));
        assert!(cart.is_empty());
    }

    #[test]
    fn retain_drops_vanished_foods_and_forgets_the_shop() {
        let mut cart = Cart::default();
        cart.add(&food(1, 7, 5), 2).unwrap();
        cart.add(&food(2, 7, 5), 1).unwrap();

        assert_eq!(cart.retain(|id| id == 2), 1);
        assert_eq!(cart.shop_id, Some(7));
        assert_eq!(cart.quantity_of(2), 1);

        assert_eq!(cart.retain(|_| false), 1);
        assert!(cart.is_empty());
        assert_eq!(cart.shop_id, None);

        // A pruned cart accepts another shop's food.
        assert_eq!(cart.add(&food(3, 8, 5), 1), Ok(1));
    }

    #[test]
    fn serializes_food_ids_as_string_keys() {
        let mut cart = Cart::default();
        cart.add(&food(12, 3, 9), 2).unwrap();

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value, serde_json::json!({"shop_id": 3, "items": {"12": 2}}));

        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}
