use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::session::CurrentUser;
use super::validation::{non_blank, parse_expiry_date, validate_id};
use super::{ApiError, ApiResponse, AppState, FoodDto, MessageResponse, ShopDashboardDto};
use crate::db::{FoodChanges, NewFood};

#[derive(Deserialize)]
pub struct FoodRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl FoodRequest {
    fn into_changes(self) -> Result<FoodChanges, ApiError> {
        Ok(FoodChanges {
            expiry_time: parse_expiry_date(self.expiry_time.as_deref())?,
            name: self.name.trim().to_string(),
            category: non_blank(self.category),
            quantity: self.quantity,
            photo_url: non_blank(self.photo_url),
            description: non_blank(self.description),
            is_active: self.is_active,
        })
    }
}

/// GET /shop/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<ShopDashboardDto>>, ApiError> {
    let dashboard = state.catalog().dashboard(&identity).await?;
    Ok(Json(ApiResponse::success(ShopDashboardDto::new(
        dashboard,
        state.placeholder_photo(),
    ))))
}

/// POST /shop/foods
pub async fn create_food(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<FoodRequest>,
) -> Result<Json<ApiResponse<FoodDto>>, ApiError> {
    let changes = payload.into_changes()?;
    let food = NewFood {
        name: changes.name,
        category: changes.category,
        quantity: changes.quantity,
        expiry_time: changes.expiry_time,
        photo_url: changes.photo_url,
        description: changes.description,
    };

    let food = state.catalog().create_food(&identity, food).await?;
    Ok(Json(ApiResponse::success(FoodDto::new(
        food,
        state.placeholder_photo(),
    ))))
}

/// PUT /shop/foods/{id}
pub async fn update_food(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<FoodRequest>,
) -> Result<Json<ApiResponse<FoodDto>>, ApiError> {
    let id = validate_id(id, "food")?;
    let changes = payload.into_changes()?;

    let food = state.catalog().update_food(&identity, id, changes).await?;
    Ok(Json(ApiResponse::success(FoodDto::new(
        food,
        state.placeholder_photo(),
    ))))
}

/// DELETE /shop/foods/{id}
pub async fn delete_food(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "food")?;
    state.catalog().delete_food(&identity, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Food {id} deleted"
    )))))
}
