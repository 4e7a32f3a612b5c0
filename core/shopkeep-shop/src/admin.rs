//! Privileged operator path.
//!
//! Admin accounts live in their own table keyed by admin key. The admin key
//! is a second factor next to username and password; all three must match.
//! Accounts are provisioned by the operator CLI, never through a shop-facing
//! flow.

use crate::directory::ShopDirectory;
use crate::error::{AdminError, AdminResult, ShopError};
use crate::model::{SearchResults, ShopView, UserSummary};
use crate::vault::{validate_password, validate_username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeep_crypto::{PasswordHash, PasswordHasher};
use shopkeep_license::{LicenseRecord, LicenseRegistry};
use shopkeep_store::{EncryptedStore, Table};
use shopkeep_types::{Plan, ShopId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// A stored admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    admin_key: String,
    username: String,
    password_hash: PasswordHash,
    display_name: String,
    role: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_changed_at: Option<DateTime<Utc>>,
}

impl AdminAccount {
    pub fn summary(&self) -> AdminSummary {
        AdminSummary {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
            password_changed_at: self.password_changed_at,
        }
    }
}

/// An admin account as shown to callers. Carries neither the password
/// hash nor the admin key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSummary {
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub password_changed_at: Option<DateTime<Utc>>,
}

/// The three factors presented on every privileged call.
pub struct AdminCredentials {
    pub admin_key: String,
    pub username: String,
    pub password: Zeroizing<String>,
}

impl AdminCredentials {
    pub fn new(
        admin_key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            admin_key: admin_key.into(),
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("admin_key", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct AdminOverrideService {
    store: Arc<EncryptedStore>,
    accounts: Mutex<BTreeMap<String, AdminAccount>>,
    hasher: PasswordHasher,
    min_password_len: usize,
    directory: Arc<ShopDirectory>,
    licenses: Arc<LicenseRegistry>,
}

impl AdminOverrideService {
    pub fn open(
        store: Arc<EncryptedStore>,
        directory: Arc<ShopDirectory>,
        licenses: Arc<LicenseRegistry>,
        hasher: PasswordHasher,
        min_password_len: usize,
    ) -> Self {
        let accounts: BTreeMap<String, AdminAccount> = store.load(Table::AdminAccounts);
        info!(count = accounts.len(), "Admin accounts loaded");
        Self {
            store,
            accounts: Mutex::new(accounts),
            hasher,
            min_password_len,
            directory,
            licenses,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, AdminAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, accounts: &BTreeMap<String, AdminAccount>) -> AdminResult<()> {
        self.store.save(Table::AdminAccounts, accounts)?;
        Ok(())
    }

    /// Checks all three factors.
    ///
    /// An unknown admin key fails before any hashing; a known key with a
    /// wrong username still pays one bcrypt verification.
    pub fn authenticate(&self, creds: &AdminCredentials) -> AdminResult<AdminSummary> {
        let account = self.lock().get(&creds.admin_key).cloned();
        let Some(account) = account else {
            warn!("Admin authentication with unknown admin key");
            return Err(AdminError::InvalidAdminKey);
        };

        let verified = if account.username == creds.username {
            self.hasher.verify(&creds.password, &account.password_hash)
        } else {
            self.hasher.verify_dummy(&creds.password)
        };
        if !verified {
            warn!(username = %creds.username, "Admin authentication failed");
            return Err(AdminError::InvalidCredentials);
        }

        info!(username = %account.username, "Admin authenticated");
        Ok(account.summary())
    }

    pub fn search_shops(&self, creds: &AdminCredentials, query: &str) -> AdminResult<SearchResults> {
        self.authenticate(creds)?;
        Ok(self.directory.search(query))
    }

    pub fn shop_details(&self, creds: &AdminCredentials, shop_id: &ShopId) -> AdminResult<ShopView> {
        self.authenticate(creds)?;
        Ok(self.directory.get_shop(shop_id)?)
    }

    /// Resets a shop user's credentials without a recovery code.
    pub fn reset_shop_credentials(
        &self,
        creds: &AdminCredentials,
        shop_id: &ShopId,
        target: &str,
        new_username: &str,
        new_password: &str,
    ) -> AdminResult<UserSummary> {
        let admin = self.authenticate(creds)?;
        let user = self
            .directory
            .reset_credentials(shop_id, target, new_username, new_password)?;
        warn!(
            admin = %admin.username,
            shop_id = %shop_id,
            from = %target,
            to = %new_username,
            "Shop credentials reset by admin"
        );
        Ok(user)
    }

    /// Issues a license on the strength of the admin key alone.
    pub fn issue_license(&self, admin_key: &str, plan: Plan) -> AdminResult<LicenseRecord> {
        if !self.lock().contains_key(admin_key) {
            warn!("License issue attempted with unknown admin key");
            return Err(AdminError::InvalidAdminKey);
        }
        Ok(self.licenses.issue(plan, true, None)?)
    }

    /// Issues a replacement license, optionally hinting at the shop it is
    /// meant for. The license is not attached to that shop.
    pub fn issue_replacement_license(
        &self,
        creds: &AdminCredentials,
        shop_id: Option<&ShopId>,
        plan: Plan,
    ) -> AdminResult<LicenseRecord> {
        let admin = self.authenticate(creds)?;
        if let Some(id) = shop_id
            && !self.directory.exists(id)
        {
            return Err(ShopError::ShopNotFound(id.clone()).into());
        }
        let record = self.licenses.issue(plan, true, shop_id.cloned())?;
        info!(admin = %admin.username, key = %record.key(), "Replacement license issued");
        Ok(record)
    }

    // ── account management ──────────────────────────────────────

    pub fn add_account(
        &self,
        admin_key: &str,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> AdminResult<AdminSummary> {
        validate_admin_key(admin_key)?;
        validate_username(username).map_err(|e| AdminError::Validation(e.to_string()))?;
        validate_password(password, self.min_password_len)
            .map_err(|e| AdminError::Validation(e.to_string()))?;
        if self.lock().contains_key(admin_key) {
            return Err(AdminError::AccountExists);
        }
        let password_hash = self.hasher.hash(password)?;

        let account = AdminAccount {
            admin_key: admin_key.to_string(),
            username: username.to_string(),
            password_hash,
            display_name: display_name.to_string(),
            role: SUPER_ADMIN_ROLE.to_string(),
            created_at: Utc::now(),
            password_changed_at: None,
        };
        let summary = account.summary();

        let mut accounts = self.lock();
        if accounts.contains_key(admin_key) {
            return Err(AdminError::AccountExists);
        }
        accounts.insert(admin_key.to_string(), account);
        if let Err(e) = self.persist(&accounts) {
            accounts.remove(admin_key);
            return Err(e);
        }

        info!(username = %username, "Admin account added");
        Ok(summary)
    }

    /// Changes an admin's password after verifying the current one.
    pub fn change_password(
        &self,
        admin_key: &str,
        current_password: &str,
        new_password: &str,
    ) -> AdminResult<()> {
        let account = self
            .lock()
            .get(admin_key)
            .cloned()
            .ok_or(AdminError::InvalidAdminKey)?;
        if !self.hasher.verify(current_password, &account.password_hash) {
            warn!(username = %account.username, "Admin password change with wrong current password");
            return Err(AdminError::InvalidCredentials);
        }
        validate_password(new_password, self.min_password_len)
            .map_err(|e| AdminError::Validation(e.to_string()))?;
        let new_hash = self.hasher.hash(new_password)?;

        let mut accounts = self.lock();
        let stored = accounts.get_mut(admin_key).ok_or(AdminError::AccountNotFound)?;
        let before = stored.clone();
        stored.password_hash = new_hash;
        stored.password_changed_at = Some(Utc::now());

        if let Err(e) = self.persist(&accounts) {
            accounts.insert(admin_key.to_string(), before);
            return Err(e);
        }

        info!(username = %account.username, "Admin password changed");
        Ok(())
    }

    pub fn remove_account(&self, admin_key: &str) -> AdminResult<AdminSummary> {
        let mut accounts = self.lock();
        let removed = accounts.remove(admin_key).ok_or(AdminError::AccountNotFound)?;
        if let Err(e) = self.persist(&accounts) {
            accounts.insert(admin_key.to_string(), removed);
            return Err(e);
        }

        warn!(username = %removed.username, "Admin account removed");
        Ok(removed.summary())
    }

    /// Summaries of every account, ordered by admin key.
    pub fn list(&self) -> Vec<AdminSummary> {
        self.lock().values().map(AdminAccount::summary).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for AdminOverrideService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminOverrideService")
            .field("accounts", &self.lock().len())
            .finish()
    }
}

fn validate_admin_key(admin_key: &str) -> AdminResult<()> {
    if admin_key.is_empty() || admin_key.chars().any(char::is_whitespace) {
        return Err(AdminError::Validation(
            "admin key must be non-empty and contain no whitespace".into(),
        ));
    }
    Ok(())
}
