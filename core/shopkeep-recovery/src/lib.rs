//! Recovery codes for Shopkeep.
//!
//! Each shop receives a small batch of codes when it is created. A code
//! lets whoever holds it reset one user's credentials without going
//! through the admin path, exactly once, and only for the shop it was
//! issued to.
//!
//! Codes look like `REC-7KQM-X3TA-P9WD`: twelve symbols drawn from an
//! alphabet without look-alike characters, so they survive being read
//! off paper.

mod code;
mod error;
mod registry;

pub use code::{RecoveryCode, CODE_ALPHABET, CODE_GROUPS, CODE_GROUP_LEN, CODE_PREFIX};
pub use error::{RecoveryError, RecoveryResult};
pub use registry::{RecoveryCodeRegistry, RecoveryRecord};
