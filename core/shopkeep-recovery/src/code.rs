use crate::error::{RecoveryError, RecoveryResult};
use serde::{Deserialize, Deserializer, Serialize};
use shopkeep_crypto::random_symbols;
use std::fmt;
use std::str::FromStr;

pub const CODE_PREFIX: &str = "REC";

/// Upper-case letters and digits minus `0 O 1 I L`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const CODE_GROUPS: usize = 3;
pub const CODE_GROUP_LEN: usize = 4;

/// A well-formed recovery code, `REC-XXXX-XXXX-XXXX`.
///
/// `Debug` and [`masked`](Self::masked) only show the first group; use
/// [`as_str`](Self::as_str) or `Display` where the full value is needed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecoveryCode(String);

impl RecoveryCode {
    /// Generates a code from the OS random source.
    pub fn generate() -> Self {
        let groups: Vec<String> = (0..CODE_GROUPS)
            .map(|_| random_symbols(CODE_ALPHABET, CODE_GROUP_LEN))
            .collect();
        Self(format!("{CODE_PREFIX}-{}", groups.join("-")))
    }

    /// Parses a code from user input.
    /// Normalizes the input (trims, uppercases, treats spaces and
    /// underscores as separators).
    pub fn parse(input: &str) -> RecoveryResult<Self> {
        let normalized = input
            .trim()
            .to_ascii_uppercase()
            .replace([' ', '_'], "-");

        let mut parts = normalized.split('-');
        if parts.next() != Some(CODE_PREFIX) {
            return Err(RecoveryError::InvalidFormat);
        }
        let groups: Vec<&str> = parts.collect();
        let well_formed = groups.len() == CODE_GROUPS
            && groups.iter().all(|g| {
                g.len() == CODE_GROUP_LEN && g.bytes().all(|b| CODE_ALPHABET.contains(&b))
            });
        if !well_formed {
            return Err(RecoveryError::InvalidFormat);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering: `REC-7KQM-****-****`.
    #[must_use]
    pub fn masked(&self) -> String {
        let visible = CODE_PREFIX.len() + 1 + CODE_GROUP_LEN;
        let head = self.0.get(..visible).unwrap_or(CODE_PREFIX);
        let hidden = vec!["*".repeat(CODE_GROUP_LEN); CODE_GROUPS - 1].join("-");
        format!("{head}-{hidden}")
    }
}

impl fmt::Display for RecoveryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RecoveryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecoveryCode").field(&self.masked()).finish()
    }
}

impl FromStr for RecoveryCode {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for RecoveryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
