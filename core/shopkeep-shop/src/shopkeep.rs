//! Wires the store, registries and services together.

use crate::admin::AdminOverrideService;
use crate::config::ShopKeepConfig;
use crate::directory::ShopDirectory;
use crate::error::ShopResult;
use crate::vault::CredentialVault;
use shopkeep_crypto::{DataEncryptor, KeyEncryptor, PasswordHasher};
use shopkeep_license::LicenseRegistry;
use shopkeep_recovery::RecoveryCodeRegistry;
use shopkeep_store::EncryptedStore;
use std::sync::Arc;
use tracing::{info, warn};

/// The assembled engine, one per process.
pub struct ShopKeep {
    store: Arc<EncryptedStore>,
    licenses: Arc<LicenseRegistry>,
    recovery: Arc<RecoveryCodeRegistry>,
    directory: Arc<ShopDirectory>,
    admin: AdminOverrideService,
}

impl ShopKeep {
    /// Loads the key described by `config` and opens every table.
    pub fn open(config: &ShopKeepConfig) -> ShopResult<Self> {
        let key = config.key_source.load()?;
        Self::with_encryptor(config, Arc::new(KeyEncryptor::new(key)))
    }

    /// Opens every table through an already constructed encryptor.
    pub fn with_encryptor(
        config: &ShopKeepConfig,
        encryptor: Arc<dyn DataEncryptor>,
    ) -> ShopResult<Self> {
        let store = Arc::new(EncryptedStore::open(&config.data_dir, encryptor)?);
        let hasher = PasswordHasher::with_cost(config.bcrypt_cost)?;

        let licenses = Arc::new(LicenseRegistry::open(Arc::clone(&store)));
        let recovery = Arc::new(RecoveryCodeRegistry::open(Arc::clone(&store)));
        let vault = CredentialVault::new(hasher.clone(), config.min_password_len);
        let directory = Arc::new(ShopDirectory::open(
            Arc::clone(&store),
            Arc::clone(&licenses),
            Arc::clone(&recovery),
            vault,
        ));
        let admin = AdminOverrideService::open(
            Arc::clone(&store),
            Arc::clone(&directory),
            Arc::clone(&licenses),
            hasher,
            config.min_password_len,
        );

        if licenses.is_empty() {
            warn!("License table is empty; seed keys with `shopkeep-admin issue-licenses`");
        }
        if admin.is_empty() {
            warn!("No admin accounts; add one with `shopkeep-admin add-admin`");
        }
        info!(
            dir = %store.dir().display(),
            shops = directory.len(),
            licenses = licenses.len(),
            "Shopkeep ready"
        );

        Ok(Self {
            store,
            licenses,
            recovery,
            directory,
            admin,
        })
    }

    pub fn store(&self) -> &Arc<EncryptedStore> {
        &self.store
    }

    pub fn licenses(&self) -> &LicenseRegistry {
        &self.licenses
    }

    pub fn recovery(&self) -> &RecoveryCodeRegistry {
        &self.recovery
    }

    pub fn directory(&self) -> &ShopDirectory {
        &self.directory
    }

    pub fn admin(&self) -> &AdminOverrideService {
        &self.admin
    }
}

impl std::fmt::Debug for ShopKeep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopKeep")
            .field("store", &self.store)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
