//! Shops, their users and the recovery paths for Shopkeep.
//!
//! This crate is the aggregate layer above the license and recovery
//! registries:
//! - [`CredentialVault`]: username uniqueness, bcrypt hashing, verification
//! - [`ShopDirectory`]: shop creation, metadata updates, user management
//!   and recovery-code redemption
//! - [`AdminOverrideService`]: the operator path that can search shops,
//!   reset credentials and issue licenses without a recovery code
//! - [`ShopKeep`]: opens everything from a [`ShopKeepConfig`]
//!
//! # Error Kinds
//!
//! [`ShopError`] and [`AdminError`] wrap the lower-layer errors unchanged;
//! use `kind()` to get the transport-independent
//! [`ErrorKind`](shopkeep_types::ErrorKind).

mod admin;
mod config;
mod directory;
mod error;
mod model;
mod shopkeep;
mod vault;

pub use admin::{AdminAccount, AdminCredentials, AdminOverrideService, AdminSummary, SUPER_ADMIN_ROLE};
pub use config::{
    ShopKeepConfig, DEFAULT_BCRYPT_COST, DEFAULT_MIN_PASSWORD_LEN, ENV_BCRYPT_COST, ENV_DATA_DIR,
    ENV_KEY_FILE, ENV_MIN_PASSWORD_LEN, ENV_PASSPHRASE, ENV_PASSPHRASE_FILE,
};
pub use directory::{ShopDirectory, RECOVERY_BATCH_SIZE};
pub use error::{AdminError, AdminResult, ShopError, ShopResult};
pub use model::{
    CreatedShop, NewUser, SearchResults, Shop, ShopConfigPayload, ShopMetadata, ShopSummary,
    ShopUser, ShopView, UserSummary,
};
pub use shopkeep::ShopKeep;
pub use vault::{validate_password, validate_username, CredentialVault, MAX_USERNAME_LEN};
