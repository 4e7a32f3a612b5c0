//! Transport-independent error taxonomy.
//!
//! Every domain error in the workspace maps onto one of these kinds so the
//! request-handling layer can pick a status code without matching on the
//! concrete error enums. None of the kinds are transient; the core never
//! retries.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Entity absent (shop, license, recovery code, user).
    NotFound,
    /// One-time token already consumed.
    AlreadyUsed,
    /// Username already present in the shop.
    DuplicateUsername,
    /// Unknown user or wrong password; deliberately undifferentiated.
    InvalidCredentials,
    /// Token bound to a different shop.
    ShopMismatch,
    /// Admin gate failure (unknown admin key or bad admin credentials).
    Unauthorized,
    /// Malformed input.
    Validation,
    /// Entity already exists under that identifier.
    Conflict,
    /// Storage or crypto failure.
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyUsed => "already_used",
            Self::DuplicateUsername => "duplicate_username",
            Self::InvalidCredentials => "invalid_credentials",
            Self::ShopMismatch => "shop_mismatch",
            Self::Unauthorized => "unauthorized",
            Self::Validation => "validation_error",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
