use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::session::CurrentUser;
use super::validation::validate_id;
use super::{AdminDashboardDto, ApiError, ApiResponse, AppState, DeletedDto};

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<AdminDashboardDto>>, ApiError> {
    let dashboard = state
        .admin()
        .dashboard(&identity, state.market.admin_recent_orders)
        .await?;

    Ok(Json(ApiResponse::success(AdminDashboardDto::new(
        dashboard,
        state.placeholder_photo(),
    ))))
}

/// DELETE /admin/shops/{id}
/// Removes the shop with its foods and orders
pub async fn delete_shop(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>, ApiError> {
    let id = validate_id(id, "shop")?;
    let removed = state.admin().delete_shop(&identity, id).await?;
    Ok(Json(ApiResponse::success(DeletedDto { removed })))
}

/// DELETE /admin/users/{id}
/// Removes the user with their orders and owned shop
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>, ApiError> {
    let id = validate_id(id, "user")?;
    let removed = state.admin().delete_user(&identity, id).await?;
    Ok(Json(ApiResponse::success(DeletedDto { removed })))
}
