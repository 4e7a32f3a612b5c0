mod common;

use common::fast_kdf;
use shopkeep_store::{
    generate_key_file, read_key_file, read_secret_file, KeySource, StoreError,
};
use tempfile::TempDir;
use zeroize::Zeroizing;

// ── key file ─────────────────────────────────────────────────────

#[test]
fn generated_key_file_loads_same_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encryption.key");

    let generated = generate_key_file(&path).unwrap();
    let loaded = KeySource::KeyFile(path.clone()).load().unwrap();
    assert_eq!(generated.as_bytes(), loaded.as_bytes());
}

#[test]
fn generate_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encryption.key");

    let first = generate_key_file(&path).unwrap();
    let err = generate_key_file(&path).unwrap_err();
    assert!(matches!(err, StoreError::KeyFileExists(_)));

    let still = read_key_file(&path).unwrap();
    assert_eq!(first.as_bytes(), still.as_bytes());
}

#[test]
fn generate_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("encryption.key");
    generate_key_file(&path).unwrap();
    assert!(path.exists());
}

#[cfg(unix)]
#[test]
fn generated_key_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encryption.key");
    generate_key_file(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn missing_key_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.key");
    let err = KeySource::KeyFile(path.clone()).load().unwrap_err();
    assert!(matches!(err, StoreError::KeyFile { .. }));
    assert!(!path.exists(), "load must not create the key file");
}

#[test]
fn short_key_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encryption.key");
    std::fs::write(&path, "AAAA\n").unwrap();
    assert!(matches!(
        read_key_file(&path).unwrap_err(),
        StoreError::KeyFile { .. }
    ));
}

#[test]
fn non_base64_key_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encryption.key");
    std::fs::write(&path, "not base64 at all!!").unwrap();
    assert!(read_key_file(&path).is_err());
}

// ── secret files ─────────────────────────────────────────────────

#[test]
fn secret_file_is_trimmed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret");
    std::fs::write(&path, "  hunter2\n").unwrap();
    assert_eq!(read_secret_file(&path).unwrap(), "hunter2");
}

#[test]
fn empty_secret_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret");
    std::fs::write(&path, "\n  \n").unwrap();
    assert!(read_secret_file(&path).is_err());
}

// ── passphrase ───────────────────────────────────────────────────

fn passphrase_source(dir: &TempDir, passphrase: &str) -> KeySource {
    KeySource::Passphrase {
        passphrase: Zeroizing::new(passphrase.to_string()),
        salt_file: dir.path().join("salt.key"),
        params: fast_kdf(),
    }
}

#[test]
fn passphrase_key_is_stable_across_loads() {
    let dir = TempDir::new().unwrap();
    let first = passphrase_source(&dir, "correct horse").load().unwrap();
    let second = passphrase_source(&dir, "correct horse").load().unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(std::fs::read(dir.path().join("salt.key")).unwrap().len(), 16);
}

#[test]
fn different_passphrase_gives_different_key() {
    let dir = TempDir::new().unwrap();
    let a = passphrase_source(&dir, "correct horse").load().unwrap();
    let b = passphrase_source(&dir, "battery staple").load().unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn corrupt_salt_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("salt.key"), b"short").unwrap();
    let err = passphrase_source(&dir, "pw").load().unwrap_err();
    assert!(matches!(err, StoreError::KeyFile { .. }));
}

#[test]
fn debug_redacts_passphrase() {
    let dir = TempDir::new().unwrap();
    let debug = format!("{:?}", passphrase_source(&dir, "topsecret"));
    assert!(!debug.contains("topsecret"));
    assert!(debug.contains("REDACTED"));
}
