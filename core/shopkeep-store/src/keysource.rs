//! Where the store key comes from.
//!
//! Two sources: a key file holding 32 random bytes (base64 text), or an
//! operator passphrase stretched with Argon2id against a persisted salt.
//! The key file is created once and never overwritten; losing it loses
//! every table encrypted under it.

use crate::error::{StoreError, StoreResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use shopkeep_crypto::{derive_key, generate_random_key, DerivedKey, KdfParams, Salt, SALT_SIZE};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Default key file name inside the data directory.
pub const DEFAULT_KEY_FILE: &str = "encryption.key";

/// Default salt file name for passphrase-derived keys.
pub const DEFAULT_SALT_FILE: &str = "salt.key";

/// How the store key is obtained.
pub enum KeySource {
    /// 32-byte key stored base64 encoded in a file.
    KeyFile(PathBuf),
    /// Key derived from a passphrase. The salt file is created on first use.
    Passphrase {
        passphrase: Zeroizing<String>,
        salt_file: PathBuf,
        params: KdfParams,
    },
}

impl KeySource {
    /// Resolves the key.
    ///
    /// A missing key file is an error; it is only ever created explicitly
    /// through [`generate_key_file`]. The passphrase salt is created on
    /// first use.
    pub fn load(&self) -> StoreResult<DerivedKey> {
        match self {
            Self::KeyFile(path) => {
                if !path.exists() {
                    return Err(StoreError::KeyFile {
                        path: path.clone(),
                        reason: "key file not found; initialize it first".to_string(),
                    });
                }
                read_key_file(path)
            }
            Self::Passphrase {
                passphrase,
                salt_file,
                params,
            } => {
                let salt = load_or_create_salt(salt_file)?;
                let key = derive_key(passphrase, &salt, params)?;
                info!(key = %key.fingerprint(), "Store key derived from passphrase");
                Ok(key)
            }
        }
    }
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
            Self::Passphrase { salt_file, params, .. } => f
                .debug_struct("Passphrase")
                .field("passphrase", &"[REDACTED]")
                .field("salt_file", salt_file)
                .field("params", params)
                .finish(),
        }
    }
}

/// Writes a fresh random key to `path`. Fails if the file already exists.
pub fn generate_key_file(path: &Path) -> StoreResult<DerivedKey> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let key = generate_random_key();
    let encoded = Zeroizing::new(STANDARD.encode(key.as_bytes()));

    let mut file = match create_private(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(StoreError::KeyFileExists(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(encoded.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    warn!(
        path = %path.display(),
        key = %key.fingerprint(),
        "Generated new store key; back this file up, data cannot be recovered without it"
    );
    Ok(key)
}

/// Reads a base64 key file written by [`generate_key_file`].
pub fn read_key_file(path: &Path) -> StoreResult<DerivedKey> {
    warn_if_exposed(path);
    let encoded = Zeroizing::new(read_secret_file(path)?);
    let bytes = Zeroizing::new(STANDARD.decode(encoded.as_bytes()).map_err(|e| {
        StoreError::KeyFile {
            path: path.to_path_buf(),
            reason: format!("not valid base64: {e}"),
        }
    })?);
    let key = DerivedKey::from_slice(&bytes).map_err(|e| StoreError::KeyFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), key = %key.fingerprint(), "Store key loaded");
    Ok(key)
}

/// Reads a secret from a file, trimming surrounding whitespace.
///
/// Empty files are rejected.
pub fn read_secret_file(path: &Path) -> StoreResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::KeyFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let secret = content.trim().to_string();
    if secret.is_empty() {
        return Err(StoreError::KeyFile {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(secret)
}

fn load_or_create_salt(path: &Path) -> StoreResult<Salt> {
    if path.exists() {
        let bytes = std::fs::read(path)?;
        let array = <[u8; SALT_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            StoreError::KeyFile {
                path: path.to_path_buf(),
                reason: format!("salt must be {SALT_SIZE} bytes, found {}", bytes.len()),
            }
        })?;
        return Ok(Salt::from_bytes(array));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let salt = Salt::random();
    let mut file = create_private(path)?;
    file.write_all(salt.as_bytes())?;
    file.sync_all()?;
    info!(path = %path.display(), "Created new key derivation salt");
    Ok(salt)
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
}

#[cfg(unix)]
fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode & 0o777),
                "Key file is readable by other users"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_exposed(_path: &Path) {}
