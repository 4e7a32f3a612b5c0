use shopkeep_crypto::{CryptoError, PasswordHash, PasswordHasher, MAX_PASSWORD_BYTES};

fn hasher() -> PasswordHasher {
    PasswordHasher::with_cost(4).unwrap()
}

#[test]
fn hash_verifies_correct_password() {
    let h = hasher();
    let hash = h.hash("p1").unwrap();
    assert!(h.verify("p1", &hash));
    assert!(!h.verify("wrong", &hash));
}

#[test]
fn hash_never_contains_plaintext() {
    let hash = hasher().hash("SuperSecret123").unwrap();
    assert!(!hash.as_str().contains("SuperSecret123"));
    assert!(hash.as_str().starts_with("$2"));
}

#[test]
fn hashes_are_salted() {
    let h = hasher();
    assert_ne!(h.hash("same").unwrap(), h.hash("same").unwrap());
}

#[test]
fn cost_is_embedded_in_hash() {
    let hash = hasher().hash("pw").unwrap();
    assert!(hash.as_str().contains("$04$"));
}

#[test]
fn hash_from_other_cost_still_verifies() {
    let old = PasswordHasher::with_cost(5).unwrap().hash("pw").unwrap();
    assert!(hasher().verify("pw", &old));
}

#[test]
fn invalid_cost_is_rejected() {
    assert!(matches!(PasswordHasher::with_cost(3), Err(CryptoError::InvalidCost(3))));
    assert!(matches!(PasswordHasher::with_cost(32), Err(CryptoError::InvalidCost(32))));
}

#[test]
fn default_cost_is_bcrypt_default() {
    assert_eq!(PasswordHasher::default().cost(), 12);
}

#[test]
fn overlong_password_is_rejected() {
    let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
    assert!(matches!(hasher().hash(&long), Err(CryptoError::PasswordTooLong { .. })));
    assert!(hasher().hash(&"x".repeat(MAX_PASSWORD_BYTES)).is_ok());
}

#[test]
fn malformed_hash_never_verifies() {
    let bogus = PasswordHash::from_encoded("not-a-bcrypt-hash");
    assert!(!hasher().verify("anything", &bogus));
}

#[test]
fn dummy_verification_always_fails() {
    let h = hasher();
    assert!(!h.verify_dummy("p1"));
    assert!(!h.verify_dummy(""));
}

#[test]
fn hash_debug_is_redacted() {
    let hash = hasher().hash("pw").unwrap();
    assert_eq!(format!("{hash:?}"), "PasswordHash([REDACTED])");
}

#[test]
fn hash_serde_is_transparent() {
    let hash = hasher().hash("pw").unwrap();
    let json = serde_json::to_string(&hash).unwrap();
    assert_eq!(json, format!("\"{}\"", hash.as_str()));
}
