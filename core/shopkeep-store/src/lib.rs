//! Encrypted file-backed table store for Shopkeep.
//!
//! Persists a handful of named logical tables (shops, licenses, recovery
//! codes, admin accounts). Each table is a JSON map keyed by the record's
//! natural identifier, encrypted as a single blob and written to its own
//! file in the data directory.
//!
//! # Durability
//!
//! - Writes are synchronous and go through a temp file in the same
//!   directory that is fsynced and renamed over the old file, so a crash
//!   mid-write leaves the previous version intact.
//! - A table that is absent loads as empty. A table that cannot be
//!   decrypted or parsed also loads as empty, after a warning is logged and
//!   the unreadable file is moved aside so the next save cannot destroy it.
//!   Callers are expected to re-seed defaults for empty tables at startup.

mod error;
mod keysource;
mod store;
mod table;

pub use error::{StoreError, StoreResult};
pub use keysource::{
    generate_key_file, read_key_file, read_secret_file, KeySource, DEFAULT_KEY_FILE,
    DEFAULT_SALT_FILE,
};
pub use store::EncryptedStore;
pub use table::Table;
