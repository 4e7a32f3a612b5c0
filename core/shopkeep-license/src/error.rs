//! Error types for the licensing module.

use shopkeep_store::StoreError;
use shopkeep_types::{ErrorKind, ShopId};
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No license with this key exists.
    #[error("license key not found: {0}")]
    NotFound(String),

    /// The license has already been redeemed.
    #[error("license key already used: {0}")]
    AlreadyUsed(String),

    /// The key string does not follow the license key format.
    #[error("invalid license key format: {0}")]
    InvalidFormat(String),

    /// Rollback requested by a shop that did not redeem the key.
    #[error("license key {key} is not redeemed by shop {shop_id}")]
    NotRedeemedBy { key: String, shop_id: ShopId },

    /// Random generation kept colliding with existing keys.
    #[error("could not generate a unique license key after {0} attempts")]
    GenerationExhausted(usize),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LicenseError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyUsed(_) => ErrorKind::AlreadyUsed,
            Self::InvalidFormat(_) => ErrorKind::Validation,
            Self::NotRedeemedBy { .. } => ErrorKind::Conflict,
            Self::GenerationExhausted(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
