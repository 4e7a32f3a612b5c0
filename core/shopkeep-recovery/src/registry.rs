//! The recovery code table.

use crate::code::RecoveryCode;
use crate::error::{RecoveryError, RecoveryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeep_store::{EncryptedStore, Table};
use shopkeep_types::ShopId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Persisted state of one recovery code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub code: RecoveryCode,
    pub shop_id: ShopId,
    pub used: bool,
    pub generated_at: DateTime<Utc>,
}

/// Owns the recovery code table.
///
/// Same discipline as the license table: one lock, write before release,
/// revert the in-memory change if the write fails.
pub struct RecoveryCodeRegistry {
    store: Arc<EncryptedStore>,
    records: Mutex<BTreeMap<String, RecoveryRecord>>,
}

impl RecoveryCodeRegistry {
    pub fn open(store: Arc<EncryptedStore>) -> Self {
        let records: BTreeMap<String, RecoveryRecord> = store.load(Table::RecoveryCodes);
        info!(count = records.len(), "Recovery code registry loaded");
        Self {
            store,
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, RecoveryRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, records: &BTreeMap<String, RecoveryRecord>) -> RecoveryResult<()> {
        self.store.save(Table::RecoveryCodes, records)?;
        Ok(())
    }

    /// Malformed input cannot name a stored code.
    fn lookup(code: &str) -> RecoveryResult<RecoveryCode> {
        RecoveryCode::parse(code).map_err(|_| RecoveryError::NotFound("<malformed>".to_string()))
    }

    /// Runs the lookup checks shared by validate and redeem.
    fn check<'a>(
        records: &'a BTreeMap<String, RecoveryRecord>,
        code: &RecoveryCode,
        shop_id: &ShopId,
    ) -> RecoveryResult<&'a RecoveryRecord> {
        let record = records
            .get(code.as_str())
            .ok_or_else(|| RecoveryError::NotFound(code.masked()))?;
        if &record.shop_id != shop_id {
            return Err(RecoveryError::ShopMismatch {
                code: code.masked(),
                shop_id: shop_id.clone(),
            });
        }
        if record.used {
            return Err(RecoveryError::AlreadyUsed(code.masked()));
        }
        Ok(record)
    }

    /// Generates `count` fresh codes for `shop_id` in one write.
    pub fn issue_batch(&self, shop_id: &ShopId, count: usize) -> RecoveryResult<Vec<RecoveryCode>> {
        let mut records = self.lock();
        let now = Utc::now();
        let mut issued: Vec<RecoveryCode> = Vec::with_capacity(count);

        for _ in 0..count {
            let fresh = (0..MAX_GENERATION_ATTEMPTS)
                .map(|_| RecoveryCode::generate())
                .find(|c| !records.contains_key(c.as_str()));
            let Some(code) = fresh else {
                for c in &issued {
                    records.remove(c.as_str());
                }
                return Err(RecoveryError::GenerationExhausted(MAX_GENERATION_ATTEMPTS));
            };
            records.insert(
                code.as_str().to_string(),
                RecoveryRecord {
                    code: code.clone(),
                    shop_id: shop_id.clone(),
                    used: false,
                    generated_at: now,
                },
            );
            issued.push(code);
        }

        if let Err(e) = self.persist(&records) {
            for c in &issued {
                records.remove(c.as_str());
            }
            return Err(e);
        }

        info!(shop_id = %shop_id, count, "Recovery codes issued");
        Ok(issued)
    }

    /// Checks that `code` exists, belongs to `shop_id` and is unused.
    /// Returns when it was generated.
    pub fn validate(&self, code: &str, shop_id: &ShopId) -> RecoveryResult<DateTime<Utc>> {
        let code = Self::lookup(code)?;
        let records = self.lock();
        Self::check(&records, &code, shop_id).map(|r| r.generated_at)
    }

    /// Consumes `code`. A second call fails with `AlreadyUsed`.
    pub fn redeem(&self, code: &str, shop_id: &ShopId) -> RecoveryResult<()> {
        let code = Self::lookup(code)?;
        let mut records = self.lock();
        if let Err(e) = Self::check(&records, &code, shop_id) {
            warn!(code = %code.masked(), shop_id = %shop_id, error = %e, "Rejected recovery code");
            return Err(e);
        }

        set_used(&mut records, &code, true);
        if let Err(e) = self.persist(&records) {
            set_used(&mut records, &code, false);
            return Err(e);
        }

        info!(code = %code.masked(), shop_id = %shop_id, "Recovery code redeemed");
        Ok(())
    }

    /// Returns a code redeemed by `shop_id` to the unused state.
    ///
    /// Compensating step for a recovery whose credential write failed
    /// after the code was consumed.
    pub fn rollback_redemption(&self, code: &str, shop_id: &ShopId) -> RecoveryResult<()> {
        let code = Self::lookup(code)?;
        let mut records = self.lock();
        match records.get(code.as_str()) {
            None => return Err(RecoveryError::NotFound(code.masked())),
            Some(r) if &r.shop_id != shop_id => {
                return Err(RecoveryError::ShopMismatch {
                    code: code.masked(),
                    shop_id: shop_id.clone(),
                });
            }
            Some(r) if !r.used => return Err(RecoveryError::NotRedeemed(code.masked())),
            Some(_) => {}
        }

        set_used(&mut records, &code, false);
        if let Err(e) = self.persist(&records) {
            set_used(&mut records, &code, true);
            return Err(e);
        }

        warn!(code = %code.masked(), shop_id = %shop_id, "Recovery code redemption rolled back");
        Ok(())
    }

    /// Drops codes from a batch whose shop was never persisted.
    pub fn discard_batch(&self, codes: &[RecoveryCode]) -> RecoveryResult<()> {
        let mut records = self.lock();
        let removed: Vec<RecoveryRecord> = codes
            .iter()
            .filter_map(|c| records.remove(c.as_str()))
            .collect();
        if removed.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.persist(&records) {
            for r in removed {
                records.insert(r.code.as_str().to_string(), r);
            }
            return Err(e);
        }

        debug!(count = removed.len(), "Recovery code batch discarded");
        Ok(())
    }

    /// Number of unused codes bound to `shop_id`.
    pub fn count_available(&self, shop_id: &ShopId) -> usize {
        self.lock()
            .values()
            .filter(|r| &r.shop_id == shop_id && !r.used)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn set_used(records: &mut BTreeMap<String, RecoveryRecord>, code: &RecoveryCode, used: bool) {
    if let Some(record) = records.get_mut(code.as_str()) {
        record.used = used;
    }
}

impl std::fmt::Debug for RecoveryCodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryCodeRegistry")
            .field("codes", &self.len())
            .finish()
    }
}
