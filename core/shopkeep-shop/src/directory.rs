//! The shop aggregate root.
//!
//! `ShopDirectory` owns the shops table and orchestrates the license and
//! recovery registries plus the credential vault.
//!
//! # Locking
//!
//! One lock covers the shops table. Operations that also touch the license
//! or recovery tables take those locks only while already holding the shops
//! lock, and those registries never call back up, so the order is fixed and
//! cannot deadlock. Password hashing and verification run before the lock
//! is taken or after it is released.
//!
//! # All-or-nothing flows
//!
//! Shop creation and recovery-code use span several tables. Each step that
//! has committed is undone by a compensating call if a later step fails;
//! a failed compensation is logged at error level.

use crate::error::{ShopError, ShopResult};
use crate::model::{
    CreatedShop, NewUser, SearchResults, Shop, ShopConfigPayload, ShopMetadata, ShopView,
    UserSummary,
};
use crate::vault::{validate_username, CredentialVault};
use chrono::{DateTime, Utc};
use shopkeep_license::{LicenseCode, LicenseRegistry};
use shopkeep_recovery::RecoveryCodeRegistry;
use shopkeep_store::{EncryptedStore, Table};
use shopkeep_types::{Plan, ShopId};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Recovery codes minted for every new shop.
pub const RECOVERY_BATCH_SIZE: usize = 5;

pub struct ShopDirectory {
    store: Arc<EncryptedStore>,
    shops: Mutex<BTreeMap<String, Shop>>,
    licenses: Arc<LicenseRegistry>,
    recovery: Arc<RecoveryCodeRegistry>,
    vault: CredentialVault,
}

impl ShopDirectory {
    pub fn open(
        store: Arc<EncryptedStore>,
        licenses: Arc<LicenseRegistry>,
        recovery: Arc<RecoveryCodeRegistry>,
        vault: CredentialVault,
    ) -> Self {
        let shops: BTreeMap<String, Shop> = store.load(Table::Shops);
        info!(count = shops.len(), "Shop directory loaded");
        Self {
            store,
            shops: Mutex::new(shops),
            licenses,
            recovery,
            vault,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Shop>> {
        self.shops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, shops: &BTreeMap<String, Shop>) -> ShopResult<()> {
        self.store.save(Table::Shops, shops)?;
        Ok(())
    }

    pub fn vault(&self) -> &CredentialVault {
        &self.vault
    }

    pub fn exists(&self, shop_id: &ShopId) -> bool {
        self.lock().contains_key(shop_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Checks a license key without consuming it.
    pub fn validate_license(&self, key: &str) -> ShopResult<Plan> {
        Ok(self.licenses.validate(key)?)
    }

    /// Creates a shop, consuming `license_key`.
    ///
    /// Either every step takes effect (license redeemed, recovery codes
    /// issued, shop stored) or none does.
    pub fn create_shop(
        &self,
        shop_id: &ShopId,
        metadata: ShopMetadata,
        license_key: &str,
        initial_users: Vec<NewUser>,
    ) -> ShopResult<CreatedShop> {
        validate_metadata(&metadata)?;
        let mut seen = HashSet::new();
        for user in &initial_users {
            if !seen.insert(user.username.as_str()) {
                return Err(ShopError::DuplicateUsername(user.username.clone()));
            }
        }
        if self.exists(shop_id) {
            return Err(ShopError::ShopExists(shop_id.clone()));
        }
        // Fail fast before paying for any hashing.
        self.licenses.validate(license_key)?;
        let canonical = LicenseCode::parse(license_key)?.into_string();
        let license_key = canonical.as_str();

        let users = initial_users
            .iter()
            .map(|u| self.vault.prepare(u))
            .collect::<ShopResult<Vec<_>>>()?;

        let mut shops = self.lock();
        if shops.contains_key(shop_id.as_str()) {
            return Err(ShopError::ShopExists(shop_id.clone()));
        }

        let plan = self.licenses.redeem(license_key, shop_id)?;

        let recovery_codes = match self.recovery.issue_batch(shop_id, RECOVERY_BATCH_SIZE) {
            Ok(codes) => codes,
            Err(e) => {
                self.undo_license(license_key, shop_id);
                return Err(e.into());
            }
        };

        let shop = Shop {
            shop_id: shop_id.clone(),
            metadata,
            license_key: license_key.to_string(),
            plan,
            users,
            recovery_codes: recovery_codes.clone(),
            created_at: Utc::now(),
        };
        shops.insert(shop_id.as_str().to_string(), shop);

        if let Err(e) = self.persist(&shops) {
            shops.remove(shop_id.as_str());
            if let Err(discard) = self.recovery.discard_batch(&recovery_codes) {
                error!(shop_id = %shop_id, error = %discard, "Failed to discard recovery codes");
            }
            self.undo_license(license_key, shop_id);
            return Err(e);
        }

        info!(shop_id = %shop_id, plan = %plan, license = %license_key, "Shop created");
        Ok(CreatedShop {
            shop_id: shop_id.clone(),
            plan,
            recovery_codes,
        })
    }

    fn undo_license(&self, license_key: &str, shop_id: &ShopId) {
        if let Err(e) = self.licenses.rollback_redemption(license_key, shop_id) {
            error!(
                shop_id = %shop_id,
                license = %license_key,
                error = %e,
                "Failed to roll back license redemption"
            );
        }
    }

    /// Shop record without password hashes or recovery code values.
    pub fn get_shop(&self, shop_id: &ShopId) -> ShopResult<ShopView> {
        let shop = self
            .lock()
            .get(shop_id.as_str())
            .cloned()
            .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
        Ok(shop.view(self.recovery.count_available(shop_id)))
    }

    /// Applies a client-submitted configuration. Only the metadata is used.
    pub fn update_shop(&self, shop_id: &ShopId, payload: ShopConfigPayload) -> ShopResult<()> {
        if let Some(submitted) = payload.license_key.as_deref() {
            let current = self
                .lock()
                .get(shop_id.as_str())
                .map(|s| s.license_key.clone());
            if let Some(current) = current
                && !LicenseCode::parse(submitted).is_ok_and(|c| c.as_str() == current)
            {
                warn!(shop_id = %shop_id, "Ignoring attempt to change shop license key");
            }
        }
        self.update_metadata(shop_id, payload.metadata)
    }

    /// Replaces the editable metadata. License key, users and creation
    /// time are preserved.
    pub fn update_metadata(&self, shop_id: &ShopId, metadata: ShopMetadata) -> ShopResult<()> {
        validate_metadata(&metadata)?;
        let mut shops = self.lock();
        let shop = shops
            .get_mut(shop_id.as_str())
            .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
        let before = std::mem::replace(&mut shop.metadata, metadata);

        if let Err(e) = self.persist(&shops) {
            if let Some(shop) = shops.get_mut(shop_id.as_str()) {
                shop.metadata = before;
            }
            return Err(e);
        }

        info!(shop_id = %shop_id, "Shop metadata updated");
        Ok(())
    }

    pub fn add_user(&self, shop_id: &ShopId, user: NewUser) -> ShopResult<UserSummary> {
        if !self.exists(shop_id) {
            return Err(ShopError::ShopNotFound(shop_id.clone()));
        }
        let prepared = self.vault.prepare(&user)?;
        let summary = prepared.summary();

        let mut shops = self.lock();
        let shop = shops
            .get_mut(shop_id.as_str())
            .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
        self.vault.add_user(shop, prepared)?;

        if let Err(e) = self.persist(&shops) {
            if let Some(shop) = shops.get_mut(shop_id.as_str()) {
                shop.users.pop();
            }
            return Err(e);
        }

        info!(shop_id = %shop_id, username = %summary.username, role = %summary.role, "User added");
        Ok(summary)
    }

    pub fn authenticate(
        &self,
        shop_id: &ShopId,
        username: &str,
        password: &str,
    ) -> ShopResult<UserSummary> {
        let candidate = {
            let shops = self.lock();
            let shop = shops
                .get(shop_id.as_str())
                .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
            shop.find_user(username).cloned()
        };

        match self.vault.verify(candidate, password) {
            Ok(user) => {
                info!(shop_id = %shop_id, username = %user.username, "User authenticated");
                Ok(user.summary())
            }
            Err(e) => {
                warn!(shop_id = %shop_id, username = %username, "Authentication failed");
                Err(e)
            }
        }
    }

    /// Renames `target` and sets its password. Used by the admin path.
    pub fn reset_credentials(
        &self,
        shop_id: &ShopId,
        target: &str,
        new_username: &str,
        new_password: &str,
    ) -> ShopResult<UserSummary> {
        validate_username(new_username)?;
        if !self.exists(shop_id) {
            return Err(ShopError::ShopNotFound(shop_id.clone()));
        }
        let hash = self.vault.hash_password(new_password)?;

        let mut shops = self.lock();
        let shop = shops
            .get_mut(shop_id.as_str())
            .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
        let before = shop.users.clone();
        let user = self.vault.apply_reset(shop, target, new_username, hash)?;

        if let Err(e) = self.persist(&shops) {
            if let Some(shop) = shops.get_mut(shop_id.as_str()) {
                shop.users = before;
            }
            return Err(e);
        }

        info!(shop_id = %shop_id, from = %target, to = %new_username, "Credentials reset");
        Ok(user.summary())
    }

    /// Checks a recovery code without consuming it.
    pub fn validate_recovery_code(&self, code: &str, shop_id: &ShopId) -> ShopResult<DateTime<Utc>> {
        Ok(self.recovery.validate(code, shop_id)?)
    }

    /// Resets credentials with a recovery code instead of the admin path.
    ///
    /// The credential change and the code redemption both take effect or
    /// neither does.
    pub fn use_recovery_code(
        &self,
        code: &str,
        shop_id: &ShopId,
        target: &str,
        new_username: &str,
        new_password: &str,
    ) -> ShopResult<UserSummary> {
        self.recovery.validate(code, shop_id)?;
        validate_username(new_username)?;
        let hash = self.vault.hash_password(new_password)?;

        let mut shops = self.lock();
        let current = shops
            .get(shop_id.as_str())
            .ok_or_else(|| ShopError::ShopNotFound(shop_id.clone()))?;
        let mut updated = current.clone();
        let user = self.vault.apply_reset(&mut updated, target, new_username, hash)?;

        self.recovery.redeem(code, shop_id)?;

        let previous = shops.insert(shop_id.as_str().to_string(), updated);
        if let Err(e) = self.persist(&shops) {
            if let Some(previous) = previous {
                shops.insert(shop_id.as_str().to_string(), previous);
            }
            if let Err(rollback) = self.recovery.rollback_redemption(code, shop_id) {
                error!(shop_id = %shop_id, error = %rollback, "Failed to roll back recovery code");
            }
            return Err(e);
        }

        info!(shop_id = %shop_id, from = %target, to = %new_username, "Credentials reset with recovery code");
        Ok(user.summary())
    }

    /// Case-insensitive substring search over name, proprietor, contact,
    /// address and id. An empty query matches every shop.
    pub fn search(&self, query: &str) -> SearchResults {
        let needle = query.trim().to_lowercase();
        let shops: Vec<_> = self
            .lock()
            .values()
            .filter(|s| needle.is_empty() || s.matches(&needle))
            .map(Shop::summary)
            .collect();
        let count = shops.len();
        SearchResults { shops, count }
    }
}

impl std::fmt::Debug for ShopDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopDirectory")
            .field("shops", &self.len())
            .finish()
    }
}

fn validate_metadata(metadata: &ShopMetadata) -> ShopResult<()> {
    if metadata.shop_name.trim().is_empty() {
        return Err(ShopError::Validation("shop name must not be empty".into()));
    }
    Ok(())
}
