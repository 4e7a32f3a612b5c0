//! Shop records and the views handed out to callers.
//!
//! Stored records (`Shop`, `ShopUser`) carry password hashes and never leave
//! the crate. Everything returned to callers is a view type built from them.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use shopkeep_crypto::PasswordHash;
use shopkeep_recovery::RecoveryCode;
use shopkeep_types::{Plan, Role, ShopId};
use zeroize::Zeroizing;

/// Caller-editable shop details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopMetadata {
    pub shop_name: String,
    pub proprietor_name: String,
    pub contact_number: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
}

impl ShopMetadata {
    pub fn new(
        shop_name: impl Into<String>,
        proprietor_name: impl Into<String>,
        contact_number: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            shop_name: shop_name.into(),
            proprietor_name: proprietor_name.into(),
            contact_number: contact_number.into(),
            address: address.into(),
            email: None,
            tax_number: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_tax_number(mut self, tax_number: impl Into<String>) -> Self {
        self.tax_number = Some(tax_number.into());
        self
    }
}

/// Shop configuration as submitted by a client.
///
/// The server-owned fields may be present, since clients echo back what
/// they were given, but their values are never applied.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfigPayload {
    #[serde(flatten)]
    pub metadata: ShopMetadata,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub users: Option<IgnoredAny>,
    #[serde(default)]
    pub created_at: Option<IgnoredAny>,
}

impl From<ShopMetadata> for ShopConfigPayload {
    fn from(metadata: ShopMetadata) -> Self {
        Self {
            metadata,
            license_key: None,
            users: None,
            created_at: None,
        }
    }
}

/// A user to be added to a shop, password still in plaintext.
pub struct NewUser {
    pub username: String,
    pub password: Zeroizing<String>,
    pub display_name: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
            display_name: display_name.into(),
            role,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}

/// A stored shop user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopUser {
    pub(crate) username: String,
    pub(crate) password_hash: PasswordHash,
    pub(crate) display_name: String,
    #[serde(default)]
    pub(crate) role: Role,
}

impl ShopUser {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}

/// A user as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

/// The stored shop aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub(crate) shop_id: ShopId,
    #[serde(flatten)]
    pub(crate) metadata: ShopMetadata,
    pub(crate) license_key: String,
    pub(crate) plan: Plan,
    pub(crate) users: Vec<ShopUser>,
    pub(crate) recovery_codes: Vec<RecoveryCode>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Shop {
    pub fn shop_id(&self) -> &ShopId {
        &self.shop_id
    }

    pub fn metadata(&self) -> &ShopMetadata {
        &self.metadata
    }

    pub fn license_key(&self) -> &str {
        &self.license_key
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn users(&self) -> &[ShopUser] {
        &self.users
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Exact, case-sensitive username lookup.
    pub fn find_user(&self, username: &str) -> Option<&ShopUser> {
        self.users.iter().find(|u| u.username == username)
    }

    pub(crate) fn view(&self, recovery_codes_available: usize) -> ShopView {
        ShopView {
            shop_id: self.shop_id.clone(),
            metadata: self.metadata.clone(),
            license_key: self.license_key.clone(),
            plan: self.plan,
            users: self.users.iter().map(ShopUser::summary).collect(),
            created_at: self.created_at,
            recovery_codes_available,
        }
    }

    pub(crate) fn summary(&self) -> ShopSummary {
        ShopSummary {
            shop_id: self.shop_id.clone(),
            shop_name: self.metadata.shop_name.clone(),
            proprietor_name: self.metadata.proprietor_name.clone(),
            contact_number: self.metadata.contact_number.clone(),
            address: self.metadata.address.clone(),
            user_count: self.users.len(),
            created_at: self.created_at,
        }
    }

    /// Case-insensitive substring match over the searchable fields.
    /// `needle` must already be lower-cased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [
            self.metadata.shop_name.as_str(),
            self.metadata.proprietor_name.as_str(),
            self.metadata.contact_number.as_str(),
            self.metadata.address.as_str(),
            self.shop_id.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Full shop as returned by lookups: no password hashes, no recovery code
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopView {
    pub shop_id: ShopId,
    #[serde(flatten)]
    pub metadata: ShopMetadata,
    pub license_key: String,
    pub plan: Plan,
    pub users: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub recovery_codes_available: usize,
}

/// Redacted search hit: no credentials and no license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopSummary {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub proprietor_name: String,
    pub contact_number: String,
    pub address: String,
    pub user_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub shops: Vec<ShopSummary>,
    pub count: usize,
}

/// Result of creating a shop. The only place recovery code values are
/// ever returned.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedShop {
    pub shop_id: ShopId,
    pub plan: Plan,
    pub recovery_codes: Vec<RecoveryCode>,
}
