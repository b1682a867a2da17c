//! Session-backed identity and cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState};
use crate::domain::access::Identity;
use crate::domain::cart::Cart;

const USER_KEY: &str = "user_id";
const CART_KEY: &str = "cart";

fn session_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::internal(format!("Session error: {e}"))
}

/// The signed-in identity, or `None` for anonymous requests.
pub struct MaybeUser(pub Option<Identity>);

/// A signed-in identity. Anonymous requests are rejected with 401.
pub struct CurrentUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| session_error(msg))?;

        let Some(user_id) = session.get::<i32>(USER_KEY).await.map_err(session_error)? else {
            return Ok(Self(None));
        };

        let identity = state.auth().identity(user_id).await?;
        match &identity {
            Some(who) => {
                tracing::Span::current().record("user_id", who.user_id);
            }
            None => {
                // Account deleted while signed in.
                session.flush().await.map_err(session_error)?;
            }
        }

        Ok(Self(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(identity) = MaybeUser::from_request_parts(parts, state).await?;
        identity.map(Self).ok_or_else(ApiError::unauthorized)
    }
}

/// Starts an authenticated session under a fresh session id.
pub async fn sign_in(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(USER_KEY, user_id)
        .await
        .map_err(session_error)
}

pub async fn sign_out(session: &Session) -> Result<(), ApiError> {
    session.flush().await.map_err(session_error)
}

pub async fn load_cart(session: &Session) -> Result<Cart, ApiError> {
    Ok(session
        .get::<Cart>(CART_KEY)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

/// Writes the cart back; an empty cart is dropped from the session entirely.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), ApiError> {
    if cart.is_empty() {
        session
            .remove::<Cart>(CART_KEY)
            .await
            .map_err(session_error)?;
        return Ok(());
    }

    session.insert(CART_KEY, cart).await.map_err(session_error)
}
