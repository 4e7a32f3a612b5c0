//! License key strings as a validated value type.

use crate::error::{LicenseError, LicenseResult};
use chrono::Datelike;
use shopkeep_crypto::random_hex_upper;
use shopkeep_types::Plan;
use std::fmt;
use std::str::FromStr;

/// Fixed prefix of every license key.
pub const KEY_PREFIX: &str = "MBM";

/// Random bytes in a generated suffix (rendered as twice as many hex digits).
pub const GENERATED_SUFFIX_BYTES: usize = 5;

/// Longest suffix accepted when parsing seeded keys.
pub const MAX_SUFFIX_LEN: usize = 16;

/// A well-formed license key: `MBM-<year>-<PLAN>-<suffix>`.
///
/// The plan is part of the key itself, so a key cannot be re-labelled to a
/// different tier without becoming a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LicenseCode {
    code: String,
    year: u16,
    plan: Plan,
}

impl LicenseCode {
    /// Generates a fresh key for `plan` stamped with the current year.
    pub fn generate(plan: Plan) -> Self {
        let year = u16::try_from(chrono::Utc::now().year()).unwrap_or(9999);
        Self::generate_for_year(plan, year)
    }

    /// Generates a fresh key for `plan` stamped with `year`.
    pub fn generate_for_year(plan: Plan, year: u16) -> Self {
        let suffix = random_hex_upper(GENERATED_SUFFIX_BYTES);
        let code = format!("{KEY_PREFIX}-{year:04}-{}-{suffix}", plan.tag());
        Self { code, year, plan }
    }

    /// Parses a key from user input.
    /// Normalizes the input (trims whitespace, uppercases).
    pub fn parse(input: &str) -> LicenseResult<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        let invalid = |reason: &str| LicenseError::InvalidFormat(format!("{reason}: {input:?}"));

        let parts: Vec<&str> = normalized.split('-').collect();
        let [prefix, year, tag, suffix] = parts.as_slice() else {
            return Err(invalid("expected four dash-separated parts"));
        };

        if *prefix != KEY_PREFIX {
            return Err(invalid("unknown prefix"));
        }
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("year must be four digits"));
        }
        let year: u16 = year.parse().map_err(|_| invalid("year must be four digits"))?;
        let plan = Plan::from_tag(tag).ok_or_else(|| invalid("unknown plan tag"))?;
        if suffix.is_empty()
            || suffix.len() > MAX_SUFFIX_LEN
            || !suffix.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(invalid("suffix must be 1-16 letters or digits"));
        }

        Ok(Self {
            code: normalized,
            year,
            plan,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn plan(&self) -> Plan {
        self.plan
    }

    #[must_use]
    pub fn year(&self) -> u16 {
        self.year
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.code
    }
}

impl fmt::Display for LicenseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for LicenseCode {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LicenseCode {
    fn as_ref(&self) -> &str {
        &self.code
    }
}
