//! `SeaORM` implementation of the `AdminService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::access::{Capability, Identity, require};
use crate::entities::Role;
use crate::services::admin_service::{AdminDashboard, AdminError, AdminService, PlatformStats};
use crate::services::catalog_service::ShopSummary;
use crate::services::order_service_impl::order_details;

pub struct SeaOrmAdminService {
    store: Store,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn dashboard(
        &self,
        identity: &Identity,
        recent_limit: u64,
    ) -> Result<AdminDashboard, AdminError> {
        require(Some(identity), Capability::Role(Role::Admin))?;

        let stats = PlatformStats {
            total_orders: self.store.orders().count().await?,
            total_users: self.store.users().count_by_role(Role::User).await?,
            total_shops: self.store.shops().count().await?,
        };

        let shops = self.store.shops().list_all().await?;
        let ids: Vec<i32> = shops.iter().map(|s| s.id).collect();
        let totals = self.store.shops().available_quantities(&ids).await?;
        let shops = shops
            .into_iter()
            .map(|shop| ShopSummary {
                available_quantity: totals.get(&shop.id).copied().unwrap_or(0),
                shop,
            })
            .collect();

        let users = self.store.users().list_all().await?;
        let recent = self.store.orders().recent(recent_limit).await?;
        let recent_orders = order_details(&self.store, recent).await?;

        Ok(AdminDashboard {
            stats,
            shops,
            users,
            recent_orders,
        })
    }

    async fn delete_shop(&self, identity: &Identity, shop_id: i32) -> Result<usize, AdminError> {
        require(Some(identity), Capability::Role(Role::Admin))?;

        let removed = self
            .store
            .cascade()
            .delete_shop(shop_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("Shop {shop_id}")))?;

        info!(shop_id, removed, by_admin = identity.user_id, "Admin deleted shop");
        Ok(removed)
    }

    async fn delete_user(&self, identity: &Identity, user_id: i32) -> Result<usize, AdminError> {
        require(Some(identity), Capability::Role(Role::Admin))?;

        let target = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("User {user_id}")))?;

        if target.id == identity.user_id || target.role == Role::Admin {
            warn!(user_id, by_admin = identity.user_id, "Refused to delete admin account");
            return Err(AdminError::ForbiddenOperation(
                "Administrator accounts cannot be deleted".to_string(),
            ));
        }

        let removed = self
            .store
            .cascade()
            .delete_user(user_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("User {user_id}")))?;

        info!(user_id, removed, by_admin = identity.user_id, "Admin deleted user");
        Ok(removed)
    }
}
