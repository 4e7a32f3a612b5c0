//! Shared test helpers for license tests.

#![allow(dead_code)]

use shopkeep_crypto::{generate_random_key, KeyEncryptor};
use shopkeep_license::LicenseRegistry;
use shopkeep_store::EncryptedStore;
use shopkeep_types::ShopId;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub fn shop(id: &str) -> ShopId {
    ShopId::parse(id).unwrap()
}

pub fn open_store(dir: &Path, key: &shopkeep_crypto::DerivedKey) -> Arc<EncryptedStore> {
    Arc::new(EncryptedStore::open(dir, Arc::new(KeyEncryptor::new(key.clone()))).unwrap())
}

/// Registry over a fresh temp dir. Keep the `TempDir` alive for the test.
pub fn temp_registry() -> (TempDir, LicenseRegistry) {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path(), &generate_random_key());
    (dir, LicenseRegistry::open(store))
}
