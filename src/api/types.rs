use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{OrderLine, User};
use crate::domain::inventory;
use crate::entities::{OrderStatus, foods, shops};
use crate::services::{
    AdminDashboard, CartContents, OrderDetails, PlatformStats, ShopDashboard, ShopDetail,
    ShopSummary,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Turns a stored photo reference into something a browser can load.
///
/// Missing or blank references get the placeholder, absolute URLs pass
/// through, and anything else is served from `/static/`.
#[must_use]
pub fn resolve_photo_url(photo: Option<&str>, placeholder: &str) -> String {
    match photo.map(str::trim).filter(|p| !p.is_empty()) {
        None => format!("/static/{}", placeholder.trim_start_matches('/')),
        Some(url) if url.contains("://") => url.to_string(),
        Some(path) => format!("/static/{}", path.trim_start_matches('/')),
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShopDto {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub rating: f64,
    pub available_quantity: i64,
}

impl ShopDto {
    #[must_use]
    pub fn new(shop: shops::Model, available_quantity: i64) -> Self {
        Self {
            id: shop.id,
            name: shop.name,
            phone: shop.phone,
            address: shop.address,
            latitude: shop.latitude,
            longitude: shop.longitude,
            opening_time: shop.opening_time,
            closing_time: shop.closing_time,
            rating: shop.rating,
            available_quantity,
        }
    }
}

impl From<ShopSummary> for ShopDto {
    fn from(summary: ShopSummary) -> Self {
        Self::new(summary.shop, summary.available_quantity)
    }
}

#[derive(Debug, Serialize)]
pub struct FoodDto {
    pub id: i32,
    pub shop_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub expiry_time: Option<NaiveDateTime>,
    pub photo_url: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl FoodDto {
    #[must_use]
    pub fn new(food: foods::Model, placeholder: &str) -> Self {
        Self {
            photo_url: resolve_photo_url(food.photo_url.as_deref(), placeholder),
            id: food.id,
            shop_id: food.shop_id,
            name: food.name,
            category: food.category,
            quantity: food.quantity,
            expiry_time: food.expiry_time,
            description: food.description,
            is_active: food.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShopDetailDto {
    pub shop: ShopDto,
    pub foods: Vec<FoodDto>,
}

impl ShopDetailDto {
    #[must_use]
    pub fn new(detail: ShopDetail, placeholder: &str) -> Self {
        Self {
            shop: detail.summary.into(),
            foods: detail
                .foods
                .into_iter()
                .map(|f| FoodDto::new(f, placeholder))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartLineDto {
    pub food_id: i32,
    pub name: String,
    pub photo_url: String,
    pub quantity: i32,
    /// Stock on hand right now; the cart does not hold any.
    pub in_stock: i32,
}

#[derive(Debug, Serialize)]
pub struct CartShopDto {
    pub id: i32,
    pub name: String,
    pub closing_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize)]
pub struct CartDto {
    pub shop: Option<CartShopDto>,
    pub lines: Vec<CartLineDto>,
    pub total_quantity: i64,
}

impl CartDto {
    #[must_use]
    pub fn new(contents: CartContents, placeholder: &str) -> Self {
        let lines: Vec<CartLineDto> = contents
            .lines
            .into_iter()
            .map(|line| CartLineDto {
                photo_url: resolve_photo_url(line.food.photo_url.as_deref(), placeholder),
                food_id: line.food.id,
                name: line.food.name,
                quantity: line.quantity,
                in_stock: line.food.quantity,
            })
            .collect();

        Self {
            shop: contents.shop.map(|s| CartShopDto {
                id: s.id,
                name: s.name,
                closing_time: s.closing_time,
            }),
            total_quantity: lines.iter().map(|l| i64::from(l.quantity)).sum(),
            lines,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub food_id: i32,
    /// `None` when the food has been removed from the catalog.
    pub name: Option<String>,
    pub photo_url: String,
    pub quantity: i32,
}

impl OrderItemDto {
    fn new(line: OrderLine, placeholder: &str) -> Self {
        Self {
            photo_url: resolve_photo_url(line.photo_url.as_deref(), placeholder),
            food_id: line.food_id,
            name: line.food_name,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i32,
    pub user_id: i32,
    pub shop_id: i32,
    pub shop_name: Option<String>,
    pub pickup_time: NaiveDateTime,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemDto>,
}

impl OrderDto {
    #[must_use]
    pub fn new(details: OrderDetails, placeholder: &str) -> Self {
        let order = details.order;
        Self {
            id: order.id,
            user_id: order.user_id,
            shop_id: order.shop_id,
            shop_name: details.shop_name,
            pickup_time: order.pickup_time,
            status: order.status,
            created_at: order.created_at,
            completed_at: order.completed_at,
            items: details
                .lines
                .into_iter()
                .map(|l| OrderItemDto::new(l, placeholder))
                .collect(),
        }
    }

    #[must_use]
    pub fn list(orders: Vec<OrderDetails>, placeholder: &str) -> Vec<Self> {
        orders
            .into_iter()
            .map(|o| Self::new(o, placeholder))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ShopDashboardDto {
    pub shop: ShopDto,
    pub foods: Vec<FoodDto>,
    pub orders: Vec<OrderDto>,
}

impl ShopDashboardDto {
    #[must_use]
    pub fn new(dashboard: ShopDashboard, placeholder: &str) -> Self {
        let available = inventory::available_quantity(&dashboard.foods);
        Self {
            shop: ShopDto::new(dashboard.shop, available),
            foods: dashboard
                .foods
                .into_iter()
                .map(|f| FoodDto::new(f, placeholder))
                .collect(),
            orders: OrderDto::list(dashboard.orders, placeholder),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardDto {
    pub stats: PlatformStats,
    pub shops: Vec<ShopDto>,
    pub users: Vec<User>,
    pub recent_orders: Vec<OrderDto>,
}

impl AdminDashboardDto {
    #[must_use]
    pub fn new(dashboard: AdminDashboard, placeholder: &str) -> Self {
        Self {
            stats: dashboard.stats,
            shops: dashboard.shops.into_iter().map(ShopDto::from).collect(),
            users: dashboard.users,
            recent_orders: OrderDto::list(dashboard.recent_orders, placeholder),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedDto {
    /// Rows removed, the target included.
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: crate::domain::OrderId,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}
