use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{self, CurrentUser};
use super::validation::{non_blank, parse_shop_hour, validate_coordinates};
use super::{ApiError, ApiResponse, AppState, MessageResponse, ShopDto};
use crate::db::{NewShop, User};
use crate::services::{AccountUpdate, Registration};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        }
    }
}

#[derive(Deserialize)]
pub struct ShopRegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub shop_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AccountRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub shop_id: Option<i32>,
}

#[derive(Serialize)]
pub struct ShopRegisterResponse {
    pub user: User,
    pub shop: ShopDto,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a consumer account and sign in
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth().register(payload.into()).await?;
    session::sign_in(&session, user.id).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/register/shop
/// Create a vendor account with its shop and sign in
pub async fn register_shop(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ShopRegisterRequest>,
) -> Result<Json<ApiResponse<ShopRegisterResponse>>, ApiError> {
    let opening_time = parse_shop_hour(payload.opening_time.as_deref(), "Opening time")?;
    let closing_time = parse_shop_hour(payload.closing_time.as_deref(), "Closing time")?;
    let (latitude, longitude) = validate_coordinates(payload.latitude, payload.longitude)?;

    let shop = NewShop {
        name: payload.shop_name.trim().to_string(),
        address: non_blank(payload.address),
        latitude,
        longitude,
        opening_time,
        closing_time,
        rating: 0.0,
    };
    let registration = Registration {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        password: payload.password,
    };

    let (user, shop) = state.auth().register_shop(registration, shop).await?;
    session::sign_in(&session, user.id).await?;

    Ok(Json(ApiResponse::success(ShopRegisterResponse {
        user,
        shop: ShopDto::new(shop, 0),
    })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state.auth().login(&payload.email, &payload.password).await?;
    session::sign_in(&session, user.id).await?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
/// Invalidate the current session, cart included
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session::sign_out(&session).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Signed out"))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = state
        .store()
        .users()
        .get_by_id(identity.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(ApiResponse::success(MeResponse {
        user,
        shop_id: identity.shop_id,
    })))
}

/// PUT /account
/// Update name and phone, optionally setting a new password
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<AccountRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .auth()
        .update_account(
            identity.user_id,
            AccountUpdate {
                name: payload.name,
                phone: payload.phone,
                new_password: payload.new_password,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(user)))
}
