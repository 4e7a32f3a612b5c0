//! Subcommand bodies.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local};
use shopkeep_shop::{ShopKeep, ShopKeepConfig};
use shopkeep_store::{generate_key_file, read_secret_file, KeySource, DEFAULT_KEY_FILE, DEFAULT_SALT_FILE};
use shopkeep_types::Plan;
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

/// Environment configuration with the command-line overrides applied.
pub fn load_config(data_dir: Option<PathBuf>, key_file: Option<PathBuf>) -> Result<ShopKeepConfig> {
    let config = ShopKeepConfig::from_env().context("invalid SHOPKEEP_* environment")?;
    Ok(apply_overrides(config, data_dir, key_file))
}

/// `data_dir` moves the default key and salt files along with it; an
/// explicitly configured key file stays where it is.
fn apply_overrides(
    mut config: ShopKeepConfig,
    data_dir: Option<PathBuf>,
    key_file: Option<PathBuf>,
) -> ShopKeepConfig {
    if let Some(dir) = data_dir {
        let old = std::mem::replace(&mut config.data_dir, dir);
        match &mut config.key_source {
            KeySource::KeyFile(path) if *path == old.join(DEFAULT_KEY_FILE) => {
                *path = config.data_dir.join(DEFAULT_KEY_FILE);
            }
            KeySource::Passphrase { salt_file, .. } if *salt_file == old.join(DEFAULT_SALT_FILE) => {
                *salt_file = config.data_dir.join(DEFAULT_SALT_FILE);
            }
            _ => {}
        }
    }
    if let Some(path) = key_file {
        config.key_source = KeySource::KeyFile(path);
    }
    config
}

fn open(config: &ShopKeepConfig) -> Result<ShopKeep> {
    ShopKeep::open(config)
        .with_context(|| format!("failed to open store in {}", config.data_dir.display()))
}

fn read_password(path: &Path) -> Result<Zeroizing<String>> {
    let secret = read_secret_file(path)
        .with_context(|| format!("failed to read password from {}", path.display()))?;
    Ok(Zeroizing::new(secret))
}

fn require_key_file(config: &ShopKeepConfig) -> Result<&Path> {
    config
        .key_file()
        .ok_or_else(|| anyhow!("a passphrase is configured; this command needs a key file"))
}

pub fn init_key(config: &ShopKeepConfig) -> Result<()> {
    let path = require_key_file(config)?;
    let key = generate_key_file(path)
        .with_context(|| format!("failed to create key file {}", path.display()))?;
    println!("Key file created: {}", path.display());
    println!("Fingerprint: {}", key.fingerprint());
    println!("Back this file up now; the store cannot be decrypted without it.");
    Ok(())
}

pub fn add_admin(
    config: &ShopKeepConfig,
    admin_key: &str,
    username: &str,
    display_name: &str,
    password_file: &Path,
) -> Result<()> {
    let password = read_password(password_file)?;
    let sk = open(config)?;
    let summary = sk
        .admin()
        .add_account(admin_key, username, display_name, &password)
        .with_context(|| format!("failed to add admin {username}"))?;
    println!("Admin account added: {} ({})", summary.username, summary.role);
    Ok(())
}

pub fn change_admin_password(
    config: &ShopKeepConfig,
    admin_key: &str,
    current_password_file: &Path,
    new_password_file: &Path,
) -> Result<()> {
    let current = read_password(current_password_file)?;
    let new = read_password(new_password_file)?;
    let sk = open(config)?;
    sk.admin()
        .change_password(admin_key, &current, &new)
        .context("failed to change admin password")?;
    println!("Admin password changed");
    Ok(())
}

pub fn remove_admin(config: &ShopKeepConfig, admin_key: &str) -> Result<()> {
    let sk = open(config)?;
    let removed = sk
        .admin()
        .remove_account(admin_key)
        .context("failed to remove admin account")?;
    println!("Admin account removed: {}", removed.username);
    Ok(())
}

pub fn list_admins(config: &ShopKeepConfig) -> Result<()> {
    let sk = open(config)?;
    let admins = sk.admin().list();
    if admins.is_empty() {
        println!("No admin accounts");
    }
    for admin in admins {
        println!(
            "{}\t{}\t{}\t{}",
            admin.username,
            admin.display_name,
            admin.role,
            admin.created_at.to_rfc3339()
        );
    }
    Ok(())
}

pub fn issue_licenses(config: &ShopKeepConfig, plan: Plan, count: usize) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let sk = open(config)?;
    let records = sk
        .licenses()
        .issue_batch(plan, count)
        .with_context(|| format!("failed to issue {count} {plan} licenses"))?;
    for record in &records {
        println!("{}", record.key());
    }
    info!(plan = %plan, count = records.len(), "Licenses issued");
    Ok(())
}

pub fn list_licenses(config: &ShopKeepConfig) -> Result<()> {
    let sk = open(config)?;
    for record in sk.licenses().list() {
        let state = match record.redeemed_by_shop() {
            Some(shop) => format!("used by {shop}"),
            None if record.is_used() => "used".to_string(),
            None => "available".to_string(),
        };
        println!("{}\t{}\t{}", record.key(), record.plan(), state);
    }
    Ok(())
}

/// Copies the key file to a timestamped name in `dest` and returns the path.
pub fn backup_key(config: &ShopKeepConfig, dest: &Path) -> Result<PathBuf> {
    let source = require_key_file(config)?;
    if !source.exists() {
        bail!("key file {} not found", source.display());
    }
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    let target = dest.join(backup_file_name(Local::now()));
    if target.exists() {
        bail!("backup {} already exists", target.display());
    }
    std::fs::copy(source, &target)
        .with_context(|| format!("failed to copy key file to {}", target.display()))?;

    println!("Key backed up to {}", target.display());
    println!("Store the backup offline; anyone holding it can decrypt the store.");
    Ok(target)
}

fn backup_file_name(at: DateTime<Local>) -> String {
    format!(
        "shopkeep_encryption_key_backup_{}.key",
        at.format("%Y%m%d_%H%M%S")
    )
}
