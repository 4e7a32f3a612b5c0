//! The license table and its redemption critical section.

use crate::code::LicenseCode;
use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use shopkeep_store::{EncryptedStore, Table};
use shopkeep_types::{Plan, ShopId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Attempts at drawing a key that is not already in the table.
const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Owns the license table.
///
/// Every operation runs under one lock. Writes hit disk before the lock is
/// released, and an in-memory change whose write fails is reverted, so the
/// table in memory never runs ahead of the file.
pub struct LicenseRegistry {
    store: Arc<EncryptedStore>,
    records: Mutex<BTreeMap<String, LicenseRecord>>,
}

impl LicenseRegistry {
    /// Loads the license table from `store`.
    pub fn open(store: Arc<EncryptedStore>) -> Self {
        let records: BTreeMap<String, LicenseRecord> = store.load(Table::Licenses);
        info!(count = records.len(), "License registry loaded");
        Self {
            store,
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, LicenseRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, records: &BTreeMap<String, LicenseRecord>) -> LicenseResult<()> {
        self.store.save(Table::Licenses, records)?;
        Ok(())
    }

    /// Normalizes `key`. Anything that cannot be a license key is unknown.
    fn lookup_key(key: &str) -> LicenseResult<String> {
        LicenseCode::parse(key)
            .map(LicenseCode::into_string)
            .map_err(|_| LicenseError::NotFound(key.trim().to_string()))
    }

    /// Checks that `key` exists and is unused. Returns its plan.
    pub fn validate(&self, key: &str) -> LicenseResult<Plan> {
        let key = Self::lookup_key(key)?;
        let records = self.lock();
        let record = records
            .get(&key)
            .ok_or_else(|| LicenseError::NotFound(key.clone()))?;
        if record.is_used() {
            return Err(LicenseError::AlreadyUsed(key));
        }
        Ok(record.plan())
    }

    /// Consumes `key` for `shop_id`. Succeeds at most once per key.
    pub fn redeem(&self, key: &str, shop_id: &ShopId) -> LicenseResult<Plan> {
        let key = Self::lookup_key(key)?;
        let mut records = self.lock();
        let record = records
            .get_mut(&key)
            .ok_or_else(|| LicenseError::NotFound(key.clone()))?;
        if record.is_used() {
            warn!(key = %key, shop_id = %shop_id, "Rejected redemption of used license");
            return Err(LicenseError::AlreadyUsed(key));
        }

        let before = record.clone();
        record.mark_used(shop_id);
        let plan = record.plan();

        if let Err(e) = self.persist(&records) {
            records.insert(key, before);
            return Err(e);
        }

        info!(key = %key, shop_id = %shop_id, plan = %plan, "License redeemed");
        Ok(plan)
    }

    /// Un-redeems `key` if, and only if, `shop_id` redeemed it.
    ///
    /// Compensating step for a shop creation that failed after the key
    /// was consumed. Not part of the normal lifecycle.
    pub fn rollback_redemption(&self, key: &str, shop_id: &ShopId) -> LicenseResult<()> {
        let key = Self::lookup_key(key)?;
        let mut records = self.lock();
        let record = records
            .get_mut(&key)
            .ok_or_else(|| LicenseError::NotFound(key.clone()))?;
        if record.redeemed_by_shop() != Some(shop_id) {
            return Err(LicenseError::NotRedeemedBy {
                key,
                shop_id: shop_id.clone(),
            });
        }

        let before = record.clone();
        record.clear_redemption();

        if let Err(e) = self.persist(&records) {
            records.insert(key, before);
            return Err(e);
        }

        warn!(key = %key, shop_id = %shop_id, "License redemption rolled back");
        Ok(())
    }

    /// Generates and stores a new key.
    pub fn issue(
        &self,
        plan: Plan,
        generated_by_admin: bool,
        assigned_shop_hint: Option<ShopId>,
    ) -> LicenseResult<LicenseRecord> {
        let mut records = self.lock();
        let record = Self::fresh_record(&records, plan, generated_by_admin, assigned_shop_hint)?;
        let key = record.key().to_string();
        records.insert(key.clone(), record.clone());

        if let Err(e) = self.persist(&records) {
            records.remove(&key);
            return Err(e);
        }

        info!(
            key = %key,
            plan = %plan,
            by_admin = generated_by_admin,
            hint = ?record.assigned_shop_hint().map(ShopId::as_str),
            "License issued"
        );
        Ok(record)
    }

    /// Generates `count` keys for `plan` in a single write.
    pub fn issue_batch(&self, plan: Plan, count: usize) -> LicenseResult<Vec<LicenseRecord>> {
        let mut records = self.lock();
        let mut issued: Vec<LicenseRecord> = Vec::with_capacity(count);
        for _ in 0..count {
            let record = match Self::fresh_record(&records, plan, true, None) {
                Ok(record) => record,
                Err(e) => {
                    for r in &issued {
                        records.remove(r.key());
                    }
                    return Err(e);
                }
            };
            records.insert(record.key().to_string(), record.clone());
            issued.push(record);
        }

        if let Err(e) = self.persist(&records) {
            for r in &issued {
                records.remove(r.key());
            }
            return Err(e);
        }

        info!(plan = %plan, count, "License batch issued");
        Ok(issued)
    }

    fn fresh_record(
        records: &BTreeMap<String, LicenseRecord>,
        plan: Plan,
        generated_by_admin: bool,
        hint: Option<ShopId>,
    ) -> LicenseResult<LicenseRecord> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = LicenseCode::generate(plan);
            if records.contains_key(code.as_str()) {
                debug!(key = %code, "Generated license key collided, retrying");
                continue;
            }
            return Ok(LicenseRecord::new(&code, generated_by_admin, hint));
        }
        Err(LicenseError::GenerationExhausted(MAX_GENERATION_ATTEMPTS))
    }

    /// Inserts pre-generated keys, skipping any already present.
    /// Returns how many were added.
    pub fn seed<I>(&self, codes: I) -> LicenseResult<usize>
    where
        I: IntoIterator<Item = LicenseCode>,
    {
        let mut records = self.lock();
        let mut added = Vec::new();
        for code in codes {
            if records.contains_key(code.as_str()) {
                continue;
            }
            records.insert(code.as_str().to_string(), LicenseRecord::new(&code, false, None));
            added.push(code.into_string());
        }
        if added.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.persist(&records) {
            for key in &added {
                records.remove(key);
            }
            return Err(e);
        }

        info!(count = added.len(), "License keys seeded");
        Ok(added.len())
    }

    /// Full record for `key`.
    pub fn info(&self, key: &str) -> LicenseResult<LicenseRecord> {
        let key = Self::lookup_key(key)?;
        self.lock()
            .get(&key)
            .cloned()
            .ok_or(LicenseError::NotFound(key))
    }

    /// Snapshot of every record, ordered by key.
    pub fn list(&self) -> Vec<LicenseRecord> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for LicenseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseRegistry")
            .field("licenses", &self.len())
            .finish()
    }
}
