//! Domain service for accounts: registration, login and profile changes.

use thiserror::Error;

use crate::db::{NewShop, User};
use crate::domain::access::Identity;
use crate::entities::shops;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email {0} is already registered")]
    EmailTaken(String),

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Sign-up form shared by consumers, vendors and admins.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub name: String,
    pub phone: Option<String>,
    /// Leave `None` (or empty) to keep the current password.
    pub new_password: Option<String>,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a consumer account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed phone or a short password
    /// - [`AuthError::EmailTaken`] if the email is already registered
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Creates a vendor account together with its shop.
    async fn register_shop(
        &self,
        registration: Registration,
        shop: NewShop,
    ) -> Result<(User, shops::Model), AuthError>;

    /// Creates an administrator. Only reachable from the command line.
    async fn register_admin(&self, registration: Registration) -> Result<User, AuthError>;

    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Resolves a signed-in user id. `None` once the account is gone.
    async fn identity(&self, user_id: i32) -> Result<Option<Identity>, AuthError>;

    async fn update_account(
        &self,
        user_id: i32,
        update: AccountUpdate,
    ) -> Result<User, AuthError>;
}
