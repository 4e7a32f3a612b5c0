//! Runtime configuration.
//!
//! Built programmatically or from `SHOPKEEP_*` environment variables. The
//! store key is never configured inline: it comes from a key file or from
//! a passphrase that is itself best delivered through a file.

use crate::error::{ShopError, ShopResult};
use shopkeep_crypto::KdfParams;
use shopkeep_store::{read_secret_file, KeySource, DEFAULT_KEY_FILE, DEFAULT_SALT_FILE};
use std::path::{Path, PathBuf};
use tracing::warn;
use zeroize::Zeroizing;

pub const ENV_DATA_DIR: &str = "SHOPKEEP_DATA_DIR";
pub const ENV_KEY_FILE: &str = "SHOPKEEP_KEY_FILE";
pub const ENV_PASSPHRASE_FILE: &str = "SHOPKEEP_PASSPHRASE_FILE";
pub const ENV_PASSPHRASE: &str = "SHOPKEEP_PASSPHRASE";
pub const ENV_BCRYPT_COST: &str = "SHOPKEEP_BCRYPT_COST";
pub const ENV_MIN_PASSWORD_LEN: &str = "SHOPKEEP_MIN_PASSWORD_LEN";

pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 1;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug)]
pub struct ShopKeepConfig {
    pub data_dir: PathBuf,
    pub key_source: KeySource,
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
}

impl ShopKeepConfig {
    /// Defaults rooted at `data_dir`, keyed by `<data_dir>/encryption.key`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let key_source = KeySource::KeyFile(data_dir.join(DEFAULT_KEY_FILE));
        Self {
            data_dir,
            key_source,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }

    pub fn with_key_source(mut self, key_source: KeySource) -> Self {
        self.key_source = key_source;
        self
    }

    /// Sets the bcrypt cost, clamped to what bcrypt accepts.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST);
        self
    }

    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len.max(1);
        self
    }

    /// Passphrase-derived key with the salt kept in the data directory.
    pub fn with_passphrase(self, passphrase: Zeroizing<String>, params: KdfParams) -> Self {
        let salt_file = self.data_dir.join(DEFAULT_SALT_FILE);
        self.with_key_source(KeySource::Passphrase {
            passphrase,
            salt_file,
            params,
        })
    }

    /// Platform data directory joined with `shopkeep`.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shopkeep")
    }

    /// The key file in use, if the key is file based.
    pub fn key_file(&self) -> Option<&Path> {
        match &self.key_source {
            KeySource::KeyFile(path) => Some(path),
            KeySource::Passphrase { .. } => None,
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> ShopResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> ShopResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_data_dir);
        let mut config = Self::new(data_dir);

        if let Some(path) = lookup(ENV_KEY_FILE) {
            config.key_source = KeySource::KeyFile(PathBuf::from(path));
        }

        let passphrase = match (lookup(ENV_PASSPHRASE_FILE), lookup(ENV_PASSPHRASE)) {
            (Some(path), inline) => {
                if inline.is_some() {
                    warn!("both {ENV_PASSPHRASE} and {ENV_PASSPHRASE_FILE} are set; using file");
                }
                Some(Zeroizing::new(read_secret_file(Path::new(&path))?))
            }
            (None, Some(inline)) => Some(Zeroizing::new(inline)),
            (None, None) => None,
        };
        if let Some(passphrase) = passphrase {
            if lookup(ENV_KEY_FILE).is_some() {
                warn!("{ENV_KEY_FILE} ignored because a passphrase is configured");
            }
            config = config.with_passphrase(passphrase, KdfParams::default());
        }

        if let Some(raw) = lookup(ENV_BCRYPT_COST) {
            let cost = parse_number::<u32>(ENV_BCRYPT_COST, &raw)?;
            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                warn!(cost, "{ENV_BCRYPT_COST} out of range, clamping");
            }
            config = config.with_bcrypt_cost(cost);
        }
        if let Some(raw) = lookup(ENV_MIN_PASSWORD_LEN) {
            config = config.with_min_password_len(parse_number(ENV_MIN_PASSWORD_LEN, &raw)?);
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> ShopResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ShopError::Config(format!("{name} must be a number, got {raw:?}")))
}
