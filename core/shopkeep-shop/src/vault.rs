//! Per-shop credential storage and verification.
//!
//! The vault never holds shop state. It validates and hashes user input,
//! and applies credential changes to a `Shop` the caller already owns, so
//! the caller decides which lock (if any) covers the change. Hashing is
//! split from applying so the slow bcrypt work can run outside that lock.

use crate::error::{ShopError, ShopResult};
use crate::model::{NewUser, Shop, ShopUser};
use shopkeep_crypto::{PasswordHash, PasswordHasher};
use tracing::debug;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct CredentialVault {
    hasher: PasswordHasher,
    min_password_len: usize,
}

impl CredentialVault {
    pub fn new(hasher: PasswordHasher, min_password_len: usize) -> Self {
        Self {
            hasher,
            min_password_len: min_password_len.max(1),
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Validates `password` against the configured minimum and hashes it.
    pub fn hash_password(&self, password: &str) -> ShopResult<PasswordHash> {
        validate_password(password, self.min_password_len)?;
        Ok(self.hasher.hash(password)?)
    }

    /// Validates a new user and hashes its password.
    pub fn prepare(&self, user: &NewUser) -> ShopResult<ShopUser> {
        validate_username(&user.username)?;
        let password_hash = self.hash_password(&user.password)?;
        Ok(ShopUser {
            username: user.username.clone(),
            password_hash,
            display_name: user.display_name.clone(),
            role: user.role,
        })
    }

    /// Appends `user` to `shop`, rejecting a username already present.
    pub fn add_user(&self, shop: &mut Shop, user: ShopUser) -> ShopResult<()> {
        if shop.find_user(&user.username).is_some() {
            return Err(ShopError::DuplicateUsername(user.username));
        }
        shop.users.push(user);
        Ok(())
    }

    /// Verifies `password` for `username` in `shop`.
    pub fn authenticate(&self, shop: &Shop, username: &str, password: &str) -> ShopResult<ShopUser> {
        self.verify(shop.find_user(username).cloned(), password)
    }

    /// Verifies `password` against an already looked-up user.
    ///
    /// An absent user still costs one bcrypt verification, so both
    /// failures look the same from outside.
    pub fn verify(&self, user: Option<ShopUser>, password: &str) -> ShopResult<ShopUser> {
        match user {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(user),
            Some(user) => {
                debug!(username = %user.username, "Password mismatch");
                Err(ShopError::InvalidCredentials)
            }
            None => {
                self.hasher.verify_dummy(password);
                Err(ShopError::InvalidCredentials)
            }
        }
    }

    /// Renames `target` to `new_username` and sets a new password.
    pub fn reset_credentials(
        &self,
        shop: &mut Shop,
        target: &str,
        new_username: &str,
        new_password: &str,
    ) -> ShopResult<ShopUser> {
        validate_username(new_username)?;
        let hash = self.hash_password(new_password)?;
        self.apply_reset(shop, target, new_username, hash)
    }

    /// Applies a reset with a password already hashed by
    /// [`hash_password`](Self::hash_password).
    ///
    /// `new_username` may equal `target` (password-only reset) but must not
    /// name a different existing user. Nothing changes on error.
    pub fn apply_reset(
        &self,
        shop: &mut Shop,
        target: &str,
        new_username: &str,
        new_hash: PasswordHash,
    ) -> ShopResult<ShopUser> {
        validate_username(new_username)?;
        let index = shop
            .users
            .iter()
            .position(|u| u.username == target)
            .ok_or_else(|| ShopError::UserNotFound(target.to_string()))?;
        if new_username != target && shop.find_user(new_username).is_some() {
            return Err(ShopError::DuplicateUsername(new_username.to_string()));
        }

        let user = &mut shop.users[index];
        user.username = new_username.to_string();
        user.password_hash = new_hash;
        Ok(user.clone())
    }
}

/// Non-empty, no surrounding whitespace, at most [`MAX_USERNAME_LEN`].
pub fn validate_username(username: &str) -> ShopResult<()> {
    if username.is_empty() {
        return Err(ShopError::Validation("username must not be empty".into()));
    }
    if username.trim() != username {
        return Err(ShopError::Validation(
            "username must not start or end with whitespace".into(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ShopError::Validation(format!(
            "username longer than {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> ShopResult<()> {
    if password.chars().count() < min_len.max(1) {
        return Err(ShopError::Validation(format!(
            "password must be at least {} characters",
            min_len.max(1)
        )));
    }
    Ok(())
}
