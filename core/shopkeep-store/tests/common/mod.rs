//! Shared helpers for store tests.

#![allow(dead_code)]

use shopkeep_crypto::{generate_random_key, DataEncryptor, KdfParams, KeyEncryptor};
use shopkeep_store::EncryptedStore;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Argon2 parameters cheap enough for tests.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

pub fn random_encryptor() -> Arc<dyn DataEncryptor> {
    Arc::new(KeyEncryptor::new(generate_random_key()))
}

/// Store in a fresh temp dir. Keep the `TempDir` alive for the test.
pub fn temp_store() -> (TempDir, EncryptedStore) {
    let dir = TempDir::new().unwrap();
    let store = EncryptedStore::open(dir.path(), random_encryptor()).unwrap();
    (dir, store)
}

pub fn open_with(dir: &Path, encryptor: Arc<dyn DataEncryptor>) -> EncryptedStore {
    EncryptedStore::open(dir, encryptor).unwrap()
}

/// Files in `dir` whose name starts with `prefix`.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix))
        .collect();
    names.sort();
    names
}
