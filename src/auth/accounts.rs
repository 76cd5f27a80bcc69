use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::{hash_password, verify_password, AuthError};
use crate::config::SuperuserConfig;
use crate::database::models::{NewUser, User};
use crate::database::{Store, StoreError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),

    #[error("User already exists")]
    AlreadyExists,

    #[error("Incorrect username or password")]
    BadCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration payload shared by self sign-up and admin creation
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    fn validate(&self) -> Result<(), AccountError> {
        if self.username.trim().is_empty() {
            return Err(AccountError::Invalid("Username is required".into()));
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !valid_email {
            return Err(AccountError::Invalid(format!("Invalid email address: {}", email)));
        }
        if self.password.is_empty() {
            return Err(AccountError::Invalid("Password is required".into()));
        }
        Ok(())
    }
}

/// Create an account; agents start unverified until an admin approves them
pub async fn register(
    store: &dyn Store,
    registration: Registration,
    is_admin: bool,
    bcrypt_cost: u32,
) -> Result<User, AccountError> {
    registration.validate()?;

    let username = registration.username.trim().to_string();
    if store.find_user_by_username(&username).await?.is_some() {
        return Err(AccountError::AlreadyExists);
    }

    let password_hash = hash_password(&registration.password, bcrypt_cost)?;
    let user = store
        .create_user(NewUser {
            username,
            email: registration.email.trim().to_string(),
            password_hash,
            is_admin,
        })
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => AccountError::AlreadyExists,
            other => other.into(),
        })?;

    info!(user_id = user.id, is_admin, "Registered user {}", user.username);
    Ok(user)
}

/// Check a username/password pair against the stored hash
pub async fn authenticate(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> Result<User, AccountError> {
    let user = store
        .find_user_by_username(username.trim())
        .await?
        .ok_or(AccountError::BadCredentials)?;

    if verify_password(password, &user.password_hash) {
        Ok(user)
    } else {
        Err(AccountError::BadCredentials)
    }
}

/// Create the configured admin account unless the username is already taken.
/// Returns the new user, or `None` when nothing was created.
pub async fn ensure_superuser(
    store: &dyn Store,
    superuser: &SuperuserConfig,
    bcrypt_cost: u32,
) -> Result<Option<User>, AccountError> {
    if store.find_user_by_username(&superuser.username).await?.is_some() {
        info!("Superuser {} already exists", superuser.username);
        return Ok(None);
    }

    let registration = Registration {
        username: superuser.username.clone(),
        email: superuser.email.clone(),
        password: superuser.password.clone(),
    };
    match register(store, registration, true, bcrypt_cost).await {
        Ok(user) => Ok(Some(user)),
        // Another process bootstrapped it first
        Err(AccountError::AlreadyExists) => Ok(None),
        Err(err) => Err(err),
    }
}
