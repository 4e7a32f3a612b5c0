//! Core type definitions for Shopkeep.
//!
//! This crate defines the small, dependency-free types shared by every
//! layer of the licensing and credential engine:
//! - Shop identifiers (caller-supplied, validated)
//! - Plan tiers carried by license keys
//! - Shop user roles
//! - The transport-independent error taxonomy (`ErrorKind`)

mod ids;
mod kind;
mod plan;
mod role;

pub use ids::{ShopId, MAX_SHOP_ID_LEN};
pub use kind::ErrorKind;
pub use plan::Plan;
pub use role::Role;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing or validating core types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid shop id: {0}")]
    InvalidShopId(String),

    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl Error {
    /// Every type-level parse failure is malformed input.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
