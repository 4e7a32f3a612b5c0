//! Abstract encryption interface for routing table blobs through a key.
//!
//! The store depends on `Arc<dyn DataEncryptor>` and never sees raw keys.
//! `KeyEncryptor` is the production implementation; tests that only care
//! about table semantics can use `PassthroughEncryptor`.

use crate::cipher::{self, EncryptedData};
use crate::key::DerivedKey;
use thiserror::Error;

/// Blob format version written as the first byte of every ciphertext.
const FORMAT_VERSION: u8 = 1;

/// Errors from the encryption layer.
#[derive(Debug, Error)]
pub enum EncryptorError {
    /// Underlying crypto failure.
    #[error("crypto error: {0}")]
    Crypto(String),
    /// Blob was written by an unknown format version.
    #[error("unsupported blob format version {0}")]
    UnsupportedVersion(u8),
}

pub type EncryptorResult<T> = Result<T, EncryptorError>;

/// Trait for encrypting/decrypting opaque byte slices.
///
/// `context` names where the blob lives (a table name). Implementations
/// must refuse to decrypt a blob under a different context than the one it
/// was encrypted with.
pub trait DataEncryptor: Send + Sync {
    /// Encrypt `data` for `context`, returning an opaque ciphertext blob.
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>>;

    /// Decrypt a blob previously produced by `encrypt_bytes` for `context`.
    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>>;

    /// Short identifier of the key in use, safe to log.
    fn key_fingerprint(&self) -> String;
}

/// ChaCha20-Poly1305 encryptor holding a single symmetric key.
///
/// Blob layout: `version (1 byte) || nonce (12) || ciphertext + tag`.
/// The context string is the AEAD associated data.
pub struct KeyEncryptor {
    key: DerivedKey,
}

impl KeyEncryptor {
    pub fn new(key: DerivedKey) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for KeyEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEncryptor")
            .field("key", &self.key.fingerprint())
            .finish()
    }
}

impl DataEncryptor for KeyEncryptor {
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>> {
        let encrypted = cipher::encrypt(&self.key, data, context.as_bytes())
            .map_err(|e| EncryptorError::Crypto(e.to_string()))?;

        let mut blob = Vec::with_capacity(1 + encrypted.len());
        blob.push(FORMAT_VERSION);
        blob.extend_from_slice(&encrypted.to_bytes());
        Ok(blob)
    }

    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>> {
        let (&version, rest) = data
            .split_first()
            .ok_or_else(|| EncryptorError::Crypto("empty blob".to_string()))?;
        if version != FORMAT_VERSION {
            return Err(EncryptorError::UnsupportedVersion(version));
        }

        let encrypted =
            EncryptedData::from_bytes(rest).map_err(|e| EncryptorError::Crypto(e.to_string()))?;
        cipher::decrypt(&self.key, &encrypted, context.as_bytes())
            .map_err(|e| EncryptorError::Crypto(e.to_string()))
    }

    fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }
}

/// No-op encryptor for tests. Data passes through unchanged.
pub struct PassthroughEncryptor;

impl DataEncryptor for PassthroughEncryptor {
    fn encrypt_bytes(&self, _context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decrypt_bytes(&self, _context: &str, data: &[u8]) -> EncryptorResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn key_fingerprint(&self) -> String {
        "passthrough".to_string()
    }
}
