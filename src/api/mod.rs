use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use chrono::{Local, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{Config, MarketConfig, ServerConfig};
use crate::services::{AdminService, AuthService, CatalogService, OrderService};
use crate::state::SharedState;

mod admin;
mod assets;
pub mod auth;
mod cart;
mod error;
mod observability;
mod orders;
pub mod session;
mod shops;
mod types;
mod validation;
mod vendor;

pub use error::ApiError;
pub use types::*;

pub const SESSION_COOKIE_NAME: &str = "foodloop_session";

/// Source of the local wall-clock time used for pickup validation.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    /// Snapshot of the market settings taken at startup.
    pub market: MarketConfig,

    pub prometheus_handle: Option<PrometheusHandle>,

    pub clock: Clock,
}

impl AppState {
    /// Replaces the wall clock, e.g. with a fixed time in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderService> {
        &self.shared.order_service
    }

    #[must_use]
    pub fn admin(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }

    #[must_use]
    pub fn placeholder_photo(&self) -> &str {
        &self.market.placeholder_photo
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let market = shared.config.read().await.market.clone();

    Arc::new(AppState {
        shared,
        market,
        prometheus_handle,
        clock: local_now,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle).await)
}

fn session_layer<S: SessionStore + Clone>(
    store: S,
    server: &ServerConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().read().await.server.clone();

    let api_routes = api_routes();
    let api_routes = if server.persistent_sessions {
        let store = SqliteStore::new(state.store().conn.get_sqlite_connection_pool().clone());
        store
            .migrate()
            .await
            .context("Failed to create the session table")?;
        api_routes.layer(session_layer(store, &server))
    } else {
        api_routes.layer(session_layer(MemoryStore::default(), &server))
    };

    Ok(Router::new()
        .nest("/api", api_routes)
        .route("/static/{*path}", get(assets::serve_static))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware)))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shops", get(shops::list_shops))
        .route("/shops/{id}", get(shops::get_shop))
        .route("/auth/register", post(auth::register))
        .route("/auth/register/shop", post(auth::register_shop))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/account", put(auth::update_account))
        .route("/cart", get(cart::get_cart))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/{food_id}", delete(cart::remove_item))
        .route("/checkout", post(cart::checkout))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/shop/dashboard", get(vendor::dashboard))
        .route("/shop/foods", post(vendor::create_food))
        .route(
            "/shop/foods/{id}",
            put(vendor::update_food).delete(vendor::delete_food),
        )
        .route("/shop/orders/{id}/status", put(orders::update_status))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/shops/{id}", delete(admin::delete_shop))
        .route("/admin/users/{id}", delete(admin::delete_user))
}
