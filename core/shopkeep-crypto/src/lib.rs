//! Encryption layer for Shopkeep.
//!
//! This crate provides:
//! - Authenticated encryption of whole table blobs (ChaCha20-Poly1305),
//!   bound to the table name through associated data
//! - Key derivation from an operator passphrase (Argon2id)
//! - Salted, adaptive password hashing for shop users and admins (bcrypt)
//! - Cryptographically secure token material for license keys and
//!   recovery codes
//!
//! # Security Properties
//!
//! - **Tamper detection**: a flipped byte, a wrong key, or a blob moved
//!   from one table file to another all fail decryption
//! - **Key hygiene**: key material is zeroized on drop and redacted from
//!   `Debug` output
//! - **No plaintext passwords**: only bcrypt hashes leave this crate

mod cipher;
mod encryptor;
mod error;
mod key;
mod password;
mod token;

pub use cipher::{decrypt, encrypt, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use encryptor::{DataEncryptor, EncryptorError, EncryptorResult, KeyEncryptor, PassthroughEncryptor};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, generate_random_key, DerivedKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
pub use password::{PasswordHash, PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{random_hex_upper, random_symbols};
