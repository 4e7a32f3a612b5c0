//! Identifier types used throughout the Shopkeep core.
//!
//! Shop ids are chosen by the caller at setup time (e.g. `shop_a42e0a33`),
//! so unlike generated ids they have to be validated on the way in.

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a shop identifier.
pub const MAX_SHOP_ID_LEN: usize = 64;

/// External identifier of a shop workspace.
///
/// Non-empty, at most [`MAX_SHOP_ID_LEN`] characters, ASCII alphanumerics,
/// `_` and `-` only. Comparison is exact (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ShopId(String);

impl ShopId {
    /// Parses and validates a shop id.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::InvalidShopId("shop id must not be empty".into()));
        }
        if s.len() > MAX_SHOP_ID_LEN {
            return Err(Error::InvalidShopId(format!(
                "shop id longer than {MAX_SHOP_ID_LEN} characters"
            )));
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(Error::InvalidShopId(format!(
                "unexpected character {bad:?} in {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShopId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShopId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ShopId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
