//! Admin account command handler

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthError, AuthService, Registration, SeaOrmAuthService};

pub async fn cmd_create_admin(
    config: &Config,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(
        store,
        config.security.clone(),
        &config.market.phone_pattern,
    )?;

    let registration = Registration {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        password: password.to_string(),
    };

    match auth.register_admin(registration).await {
        Ok(user) => {
            println!("✓ Admin account created: {} (id {})", user.email, user.id);
            Ok(())
        }
        Err(AuthError::EmailTaken(email)) => {
            println!("An account already uses {email}");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to create admin account"),
    }
}
