use crate::error::StoreResult;
use crate::table::Table;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shopkeep_crypto::DataEncryptor;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Encrypted persistence for named tables of JSON-shaped records.
///
/// Holds no table state itself; the registries built on top own the
/// in-memory copies and call [`save`](Self::save) after every mutation.
/// Concurrent saves of the same table must be serialized by the caller.
pub struct EncryptedStore {
    dir: PathBuf,
    encryptor: Arc<dyn DataEncryptor>,
}

impl EncryptedStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>, encryptor: Arc<dyn DataEncryptor>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(
            dir = %dir.display(),
            key = %encryptor.key_fingerprint(),
            "Encrypted store opened"
        );
        Ok(Self { dir, encryptor })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `table`.
    pub fn path_of(&self, table: Table) -> PathBuf {
        self.dir.join(table.file_name())
    }

    pub fn exists(&self, table: Table) -> bool {
        self.path_of(table).exists()
    }

    /// Loads `table`, degrading to an empty map on any failure.
    ///
    /// Absent file: empty, silently (first start). Unreadable, undecryptable
    /// or malformed file: empty, with a warning, and the file is moved
    /// aside to `<file>.corrupt-<timestamp>` so it survives the next save.
    pub fn load<T: DeserializeOwned>(&self, table: Table) -> BTreeMap<String, T> {
        match self.try_load(table) {
            Ok(Some(records)) => {
                debug!(table = %table, count = records.len(), "Table loaded");
                records
            }
            Ok(None) => {
                debug!(table = %table, "Table file absent, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(
                    table = %table,
                    error = %e,
                    "Table could not be loaded (wrong key or corrupt file); treating as empty"
                );
                self.quarantine(table);
                BTreeMap::new()
            }
        }
    }

    /// Loads `table`, surfacing failures. `Ok(None)` if the file is absent.
    pub fn try_load<T: DeserializeOwned>(
        &self,
        table: Table,
    ) -> StoreResult<Option<BTreeMap<String, T>>> {
        let path = self.path_of(table);
        let blob = match std::fs::read(&path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let plaintext = self.encryptor.decrypt_bytes(table.name(), &blob)?;
        let records = serde_json::from_slice(&plaintext)?;
        Ok(Some(records))
    }

    /// Serializes, encrypts and atomically replaces the file for `table`.
    ///
    /// `BTreeMap` keeps the serialized form deterministic for a given set
    /// of records.
    pub fn save<T: Serialize>(&self, table: Table, records: &BTreeMap<String, T>) -> StoreResult<()> {
        let plaintext = serde_json::to_vec(records)?;
        let blob = self.encryptor.encrypt_bytes(table.name(), &plaintext)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&blob)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_of(table))?;

        debug!(table = %table, count = records.len(), bytes = blob.len(), "Table saved");
        Ok(())
    }

    /// Moves an unreadable table file out of the way.
    fn quarantine(&self, table: Table) {
        let path = self.path_of(table);
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let aside = self
            .dir
            .join(format!("{}.corrupt-{stamp}", table.file_name()));
        match std::fs::rename(&path, &aside) {
            Ok(()) => warn!(
                table = %table,
                moved_to = %aside.display(),
                "Unreadable table file moved aside"
            ),
            Err(e) => warn!(
                table = %table,
                error = %e,
                "Unreadable table file could not be moved aside"
            ),
        }
    }
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("dir", &self.dir)
            .field("key", &self.encryptor.key_fingerprint())
            .finish()
    }
}
