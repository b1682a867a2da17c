use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, AuthService, CatalogService, OrderService, SeaOrmAdminService,
    SeaOrmAuthService, SeaOrmCatalogService, SeaOrmOrderService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub order_service: Arc<dyn OrderService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires every service around an already connected store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            &config.market.phone_pattern,
        )?) as Arc<dyn AuthService + Send + Sync + 'static>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone()))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let order_service = Arc::new(SeaOrmOrderService::new(store.clone()))
            as Arc<dyn OrderService + Send + Sync + 'static>;

        let admin_service = Arc::new(SeaOrmAdminService::new(store.clone()))
            as Arc<dyn AdminService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            catalog_service,
            order_service,
            admin_service,
        })
    }
}
