//! License lifecycle for Shopkeep.
//!
//! A license key is a one-time token that unlocks creation of exactly one
//! shop and carries the plan tier that shop runs on.
//!
//! # Lifecycle
//!
//! - **Issued**: seeded in bulk by the operator, or generated on demand
//!   through the admin path. `used = false`.
//! - **Redeemed**: consumed by shop creation. `used = true`, with the
//!   redeeming shop and time recorded. Redemption happens at most once;
//!   the check and the mark-used write share one critical section.
//!
//! Records are never deleted.
//!
//! # Key Format
//!
//! `MBM-<year>-<PLAN>-<suffix>`, e.g. `MBM-2025-PREMIUM-3F9A0C1D7E`.
//! Generated suffixes carry 40 bits from the OS random source.

mod code;
mod error;
mod record;
mod registry;

pub use code::{LicenseCode, GENERATED_SUFFIX_BYTES, KEY_PREFIX, MAX_SUFFIX_LEN};
pub use error::{LicenseError, LicenseResult};
pub use record::LicenseRecord;
pub use registry::LicenseRegistry;
