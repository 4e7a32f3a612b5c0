#![allow(dead_code)]

use shopkeep_crypto::{generate_random_key, KeyEncryptor};
use shopkeep_recovery::RecoveryCodeRegistry;
use shopkeep_store::EncryptedStore;
use shopkeep_types::ShopId;
use std::sync::Arc;
use tempfile::TempDir;

pub fn shop(id: &str) -> ShopId {
    ShopId::parse(id).unwrap()
}

pub fn temp_registry() -> (TempDir, RecoveryCodeRegistry) {
    let dir = TempDir::new().unwrap();
    let encryptor = Arc::new(KeyEncryptor::new(generate_random_key()));
    let store = Arc::new(EncryptedStore::open(dir.path(), encryptor).unwrap());
    (dir, RecoveryCodeRegistry::open(store))
}
