use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, ShopDetailDto, ShopDto};

/// GET /shops
/// Every shop with its available quantity
pub async fn list_shops(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ShopDto>>>, ApiError> {
    let shops = state.catalog().list_shops().await?;
    Ok(Json(ApiResponse::success(
        shops.into_iter().map(ShopDto::from).collect(),
    )))
}

/// GET /shops/{id}
/// Shop detail with its active foods
pub async fn get_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ShopDetailDto>>, ApiError> {
    let id = validate_id(id, "shop")?;
    let detail = state.catalog().shop_detail(id).await?;

    Ok(Json(ApiResponse::success(ShopDetailDto::new(
        detail,
        state.placeholder_photo(),
    ))))
}
