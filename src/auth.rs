//! Registration and credential checks.
//!
//! Passwords are stored as bcrypt hashes and checked with `bcrypt::verify`;
//! the plaintext never reaches disk or the logs.

use anyhow::Context;
use std::sync::OnceLock;

use crate::error::AppError;
use crate::user_models::{RegisterForm, User, UserIdentity};
use crate::user_storage::UserStorage;

pub const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(users: &UserStorage, form: RegisterForm, cost: u32) -> Result<User, AppError> {
    if form.username.trim().is_empty() {
        return Err(AppError::Validation("Username cannot be empty.".into()));
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }

    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")?;

    let user = users
        .create_user(User::new(form.username, form.email, password_hash))
        .await?;

    tracing::info!(username = %user.username, user_id = %user.id, "user registered");
    Ok(user)
}

/// Hash checked against when the username does not exist, so an unknown
/// user costs the same bcrypt work as a wrong password.
fn dummy_hash(cost: u32) -> anyhow::Result<&'static str> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = bcrypt::hash("wardrobe-no-such-user", cost).context("Failed to build dummy hash")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

/// `cost` only sizes the stand-in hash used for unknown usernames; stored
/// hashes carry their own cost.
pub async fn authenticate(
    users: &UserStorage,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<UserIdentity, AppError> {
    let user = users.get_user_by_username(username).await;

    let password = password.to_owned();
    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => tokio::task::spawn_blocking(move || dummy_hash(cost))
            .await
            .context("Password verification task failed")??
            .to_owned(),
    };
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")?;

    let user = match user {
        Some(user) if valid => user,
        Some(_) => {
            tracing::info!(%username, "login failed: wrong password");
            return Err(AppError::AuthFailure);
        }
        None => {
            tracing::info!(%username, "login failed: unknown user");
            return Err(AppError::AuthFailure);
        }
    };

    tracing::info!(%username, "login succeeded");
    Ok(user.identity())
}
