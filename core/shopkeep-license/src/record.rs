use crate::code::LicenseCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeep_types::{Plan, ShopId};

/// Persisted state of one license key.
///
/// `used_at` and `redeemed_by_shop` are set together, at redemption, and
/// only then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    key: String,
    plan: Plan,
    used: bool,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    used_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redeemed_by_shop: Option<ShopId>,
    #[serde(default)]
    generated_by_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigned_shop_hint: Option<ShopId>,
}

impl LicenseRecord {
    pub(crate) fn new(code: &LicenseCode, generated_by_admin: bool, hint: Option<ShopId>) -> Self {
        Self {
            key: code.as_str().to_string(),
            plan: code.plan(),
            used: false,
            created_at: Utc::now(),
            used_at: None,
            redeemed_by_shop: None,
            generated_by_admin,
            assigned_shop_hint: hint,
        }
    }

    pub(crate) fn mark_used(&mut self, shop_id: &ShopId) {
        self.used = true;
        self.used_at = Some(Utc::now());
        self.redeemed_by_shop = Some(shop_id.clone());
    }

    pub(crate) fn clear_redemption(&mut self) {
        self.used = false;
        self.used_at = None;
        self.redeemed_by_shop = None;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    pub fn redeemed_by_shop(&self) -> Option<&ShopId> {
        self.redeemed_by_shop.as_ref()
    }

    pub fn generated_by_admin(&self) -> bool {
        self.generated_by_admin
    }

    pub fn assigned_shop_hint(&self) -> Option<&ShopId> {
        self.assigned_shop_hint.as_ref()
    }
}
