//! Error types for the storage layer.

use shopkeep_crypto::{CryptoError, EncryptorError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Encryption/decryption error.
    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptorError),

    /// Key material error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Key, salt or secret file is unreadable or malformed.
    #[error("invalid key file {}: {reason}", path.display())]
    KeyFile { path: PathBuf, reason: String },

    /// Refusing to overwrite an existing key file.
    #[error("key file already exists: {}", .0.display())]
    KeyFileExists(PathBuf),

    /// Atomic rename of the temp file failed.
    #[error("failed to replace table file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
