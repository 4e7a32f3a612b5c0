//! License plan tiers.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tier carried by a license key and propagated to the shop it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Starter,
    Basic,
    Premium,
    Enterprise,
    Ultimate,
}

impl Plan {
    /// All plans, lowest tier first.
    pub const ALL: [Plan; 5] = [
        Plan::Starter,
        Plan::Basic,
        Plan::Premium,
        Plan::Enterprise,
        Plan::Ultimate,
    ];

    /// Lower-case wire name (`"starter"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
            Self::Ultimate => "ultimate",
        }
    }

    /// Upper-case tag embedded in license keys (`"STARTER"`).
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Starter => "STARTER",
            Self::Basic => "BASIC",
            Self::Premium => "PREMIUM",
            Self::Enterprise => "ENTERPRISE",
            Self::Ultimate => "ULTIMATE",
        }
    }

    /// Resolves a key tag back to its plan.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = Error;

    /// Case-insensitive: accepts both `basic` and `BASIC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| Error::UnknownPlan(s.to_string()))
    }
}
