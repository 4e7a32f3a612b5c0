//! Error types for shop and admin operations.

use shopkeep_crypto::CryptoError;
use shopkeep_license::LicenseError;
use shopkeep_recovery::RecoveryError;
use shopkeep_store::StoreError;
use shopkeep_types::{ErrorKind, ShopId};
use thiserror::Error;

/// Result type for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors from the shop directory and credential vault.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    #[error("shop already exists: {0}")]
    ShopExists(ShopId),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("username already exists in this shop: {0}")]
    DuplicateUsername(String),

    /// Unknown user and wrong password are deliberately the same error.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error("password hashing error: {0}")]
    Password(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Types(#[from] shopkeep_types::Error),
}

impl ShopError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShopNotFound(_) | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::ShopExists(_) => ErrorKind::Conflict,
            Self::DuplicateUsername(_) => ErrorKind::DuplicateUsername,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Password(CryptoError::PasswordTooLong { .. }) => ErrorKind::Validation,
            Self::License(e) => e.kind(),
            Self::Recovery(e) => e.kind(),
            Self::Types(e) => e.kind(),
            Self::Config(_) | Self::Password(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

/// Errors from the admin override path.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid admin key")]
    InvalidAdminKey,

    #[error("invalid admin username or password")]
    InvalidCredentials,

    #[error("admin account already exists for this admin key")]
    AccountExists,

    #[error("admin account not found")]
    AccountNotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error("password hashing error: {0}")]
    Password(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AdminError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAdminKey => ErrorKind::Unauthorized,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::AccountExists => ErrorKind::Conflict,
            Self::AccountNotFound => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Password(CryptoError::PasswordTooLong { .. }) => ErrorKind::Validation,
            Self::Shop(e) => e.kind(),
            Self::License(e) => e.kind(),
            Self::Password(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// True for failures of the admin gate itself.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidAdminKey | Self::InvalidCredentials)
    }
}
