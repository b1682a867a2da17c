//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{NewShop, NewUser, ProfileChanges, Store, User};
use crate::domain::access::Identity;
use crate::entities::{Role, shops};
use crate::services::auth_service::{AccountUpdate, AuthError, AuthService, Registration};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    phone_pattern: Regex,
}

impl SeaOrmAuthService {
    pub fn new(
        store: Store,
        security: SecurityConfig,
        phone_pattern: &str,
    ) -> anyhow::Result<Self> {
        let phone_pattern = Regex::new(phone_pattern)
            .map_err(|e| anyhow::anyhow!("Invalid phone pattern '{phone_pattern}': {e}"))?;

        Ok(Self {
            store,
            security,
            phone_pattern,
        })
    }

    /// Blank phones are stored as `None`; anything else must match the pattern.
    fn check_phone(&self, phone: Option<String>) -> Result<Option<String>, AuthError> {
        let phone = phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if let Some(p) = &phone
            && !self.phone_pattern.is_match(p)
        {
            return Err(AuthError::Validation(
                "Phone number format is invalid".to_string(),
            ));
        }
        Ok(phone)
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }

    async fn check_registration(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<NewUser, AuthError> {
        let name = registration.name.trim().to_string();
        let email = registration.email.trim().to_string();

        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }

        let phone = self.check_phone(registration.phone)?;
        self.check_password(&registration.password)?;

        if self.store.users().email_exists(&email).await? {
            return Err(AuthError::EmailTaken(email));
        }

        Ok(NewUser {
            name,
            email,
            phone,
            password: registration.password,
            role,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let new_user = self.check_registration(registration, Role::User).await?;
        let user = self.store.users().create(new_user, &self.security).await?;

        info!(user_id = user.id, "Registered consumer account");
        Ok(user)
    }

    async fn register_shop(
        &self,
        registration: Registration,
        shop: NewShop,
    ) -> Result<(User, shops::Model), AuthError> {
        if shop.name.trim().is_empty() {
            return Err(AuthError::Validation("Shop name is required".to_string()));
        }

        let new_user = self.check_registration(registration, Role::Shop).await?;

        // Legacy shops without an owner account still hold their manager email.
        if self
            .store
            .shops()
            .manager_email_exists(&new_user.email)
            .await?
        {
            return Err(AuthError::EmailTaken(new_user.email));
        }

        let (user, shop) = self
            .store
            .users()
            .create_vendor(new_user, shop, &self.security)
            .await?;

        info!(user_id = user.id, shop_id = shop.id, "Registered shop account");
        Ok((user, shop))
    }

    async fn register_admin(&self, registration: Registration) -> Result<User, AuthError> {
        let new_user = self.check_registration(registration, Role::Admin).await?;
        let user = self.store.users().create(new_user, &self.security).await?;

        info!(user_id = user.id, "Created admin account");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.store
            .users()
            .verify_password(email.trim(), password)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn identity(&self, user_id: i32) -> Result<Option<Identity>, AuthError> {
        let Some(user) = self.store.users().get_by_id(user_id).await? else {
            return Ok(None);
        };

        let shop_id = match user.role {
            Role::Shop => self.store.shops().get_by_owner(user.id).await?.map(|s| s.id),
            Role::User | Role::Admin => None,
        };

        Ok(Some(Identity {
            user_id: user.id,
            role: user.role,
            shop_id,
        }))
    }

    async fn update_account(
        &self,
        user_id: i32,
        update: AccountUpdate,
    ) -> Result<User, AuthError> {
        let name = update.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        let phone = self.check_phone(update.phone)?;

        let new_password = update.new_password.filter(|p| !p.is_empty());
        if let Some(password) = &new_password {
            self.check_password(password)?;
        }

        if self.store.users().get_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let user = self
            .store
            .users()
            .update_profile(
                user_id,
                ProfileChanges {
                    name,
                    phone,
                    new_password,
                },
                &self.security,
            )
            .await?;

        info!(user_id, "Updated account");
        Ok(user)
    }
}
