//! Password hashing for shop users and admin accounts.
//!
//! bcrypt with a per-hash random salt; the cost factor is embedded in the
//! hash string so it can be raised later without invalidating old hashes.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// bcrypt only looks at the first 72 bytes of input. Longer passwords are
/// rejected instead of being silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

const DUMMY_PASSWORD: &str = "shopkeep-timing-equalizer";

/// Salt and digest of a well-formed bcrypt hash, costed per hasher.
const FIXED_DUMMY_TAIL: &str = "CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

/// An opaque, irreversible password hash (`$2b$...`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an existing hash string (e.g. loaded from storage).
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash of a throwaway password, verified against when the username is
    /// unknown so both failure paths pay one bcrypt verification.
    dummy: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> CryptoResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CryptoError::InvalidCost(cost));
        }
        Ok(Self {
            cost,
            dummy: Arc::new(OnceLock::new()),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> CryptoResult<PasswordHash> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CryptoError::PasswordTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(PasswordHash(bcrypt::hash(password, self.cost)?))
    }

    /// Returns true if `password` matches `hash`.
    ///
    /// A malformed stored hash never verifies; it is reported once as a
    /// warning since it means the stored record is damaged.
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        match bcrypt::verify(password, hash.as_str()) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                false
            }
        }
    }

    /// Spends the same work as a real verification and always fails.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self
            .dummy
            .get_or_init(|| match bcrypt::hash(DUMMY_PASSWORD, self.cost) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(error = %e, "dummy hash generation failed; using fixed hash");
                    fixed_dummy_hash(self.cost)
                }
            });
        let _ = bcrypt::verify(password, dummy);
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
            dummy: Arc::new(OnceLock::new()),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish()
    }
}

fn fixed_dummy_hash(cost: u32) -> String {
    format!("$2b${cost:02}${FIXED_DUMMY_TAIL}")
}
