use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::session::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, OrderDto, StatusUpdateRequest};
use crate::domain::OrderId;
use crate::services::CancelOutcome;

#[derive(Serialize)]
pub struct CancelResponse {
    pub outcome: CancelOutcome,
    pub order: OrderDto,
}

/// GET /orders
/// The caller's own orders, newest first
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state.orders().list_orders(&identity).await?;
    Ok(Json(ApiResponse::success(OrderDto::list(
        orders,
        state.placeholder_photo(),
    ))))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = OrderId::new(validate_id(id, "order")?);
    let details = state.orders().get_order(&identity, id).await?;

    Ok(Json(ApiResponse::success(OrderDto::new(
        details,
        state.placeholder_photo(),
    ))))
}

/// POST /orders/{id}/cancel
/// Cancel and restock. Cancelling twice is reported as success.
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CancelResponse>>, ApiError> {
    let id = OrderId::new(validate_id(id, "order")?);
    let cancellation = state.orders().cancel(&identity, id).await?;

    Ok(Json(ApiResponse::success(CancelResponse {
        outcome: cancellation.outcome,
        order: OrderDto::new(cancellation.order, state.placeholder_photo()),
    })))
}

/// PUT /shop/orders/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = OrderId::new(validate_id(id, "order")?);
    let details = state
        .orders()
        .update_status(&identity, id, &payload.status)
        .await?;

    Ok(Json(ApiResponse::success(OrderDto::new(
        details,
        state.placeholder_photo(),
    ))))
}
