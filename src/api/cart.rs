use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{self, CurrentUser};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, CartDto, CheckoutResponse};

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub food_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub pickup_time: Option<String>,
}

#[derive(Serialize)]
pub struct AddToCartResponse {
    pub food_id: i32,
    /// Quantity now held for this food after clamping to stock.
    pub quantity: i32,
    pub cart: CartDto,
}

async fn cart_dto(state: &AppState, session: &Session) -> Result<CartDto, ApiError> {
    let mut cart = session::load_cart(session).await?;
    let contents = state.orders().cart_contents(&mut cart).await?;
    session::save_cart(session, &cart).await?;
    Ok(CartDto::new(contents, state.placeholder_photo()))
}

/// GET /cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(_identity): CurrentUser,
    session: Session,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    Ok(Json(ApiResponse::success(cart_dto(&state, &session).await?)))
}

/// POST /cart/items
/// Add a food to the cart. The cart holds one shop's food at a time.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(_identity): CurrentUser,
    session: Session,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<AddToCartResponse>>, ApiError> {
    let food_id = validate_id(payload.food_id, "food")?;

    let mut cart = session::load_cart(&session).await?;
    let held = state
        .orders()
        .add_to_cart(&mut cart, food_id, payload.quantity)
        .await?;
    session::save_cart(&session, &cart).await?;

    Ok(Json(ApiResponse::success(AddToCartResponse {
        food_id,
        quantity: held,
        cart: cart_dto(&state, &session).await?,
    })))
}

/// DELETE /cart/items/{food_id}
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(_identity): CurrentUser,
    session: Session,
    Path(food_id): Path<i32>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let mut cart = session::load_cart(&session).await?;
    if cart.remove(food_id) {
        tracing::debug!(food_id, "Removed from cart");
    }
    session::save_cart(&session, &cart).await?;

    Ok(Json(ApiResponse::success(cart_dto(&state, &session).await?)))
}

/// POST /checkout
/// Turn the cart into a pending order for today's pickup
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    session: Session,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, ApiError> {
    let mut cart = session::load_cart(&session).await?;
    let now = state.now();

    let order_id = state
        .orders()
        .checkout(&identity, &cart, payload.pickup_time.as_deref(), now)
        .await?;

    cart.clear();
    session::save_cart(&session, &cart).await?;

    Ok(Json(ApiResponse::success(CheckoutResponse { order_id })))
}
