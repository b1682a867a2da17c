//! Stock arithmetic shared by checkout and shop listings.

use crate::entities::foods;

/// Sum of stock over the active foods of a shop. Inactive foods never count.
#[must_use]
pub fn available_quantity<'a>(foods: impl IntoIterator<Item = &'a foods::Model>) -> i64 {
    foods
        .into_iter()
        .filter(|f| f.is_active)
        .map(|f| i64::from(f.quantity.max(0)))
        .sum()
}

/// Outcome of booking one cart line against current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub requested: i32,
    pub booked: i32,
    /// Stock left on the food after the booking.
    pub remaining: i32,
}

impl Booking {
    #[must_use]
    pub const fn is_short(&self) -> bool {
        self.booked < self.requested
    }
}

/// Books `min(stock, requested)`; neither side may go negative.
#[must_use]
pub fn book(stock: i32, requested: i32) -> Booking {
    let stock = stock.max(0);
    let booked = requested.clamp(0, stock);
    Booking {
        requested,
        booked,
        remaining: stock - booked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn food(id: i32, quantity: i32, is_active: bool) -> foods::Model {
        foods::Model {
            id,
            shop_id: 1,
            name: format!("Food {id}"),
            category: None,
            quantity,
            expiry_time: None,
            photo_url: None,
            description: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn available_quantity_ignores_inactive_foods() {
        let foods = [food(1, 5, true), food(2, 10, false), food(3, 2, true)];
        assert_eq!(available_quantity(&foods), 7);
    }

    #[test]
    fn available_quantity_of_empty_shop_is_zero() {
        assert_eq!(available_quantity(&Vec::<foods::Model>::new()), 0);
    }

    #[test]
    fn booking_within_stock() {
        assert_eq!(
            book(4, 2),
            Booking {
                requested: 2,
                booked: 2,
                remaining: 2
            }
        );
    }

    #[test]
    fn booking_beyond_stock_is_capped() {
        let b = book(2, 5);
        assert_eq!(b.booked, 2);
        assert_eq!(b.remaining, 0);
        assert!(b.is_short());
    }

    #[test]
    fn booking_from_empty_stock_books_nothing() {
        let b = book(0, 3);
        assert_eq!(b.booked, 0);
        assert_eq!(b.remaining, 0);
    }
}
