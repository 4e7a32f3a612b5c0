use proptest::prelude::*;
use shopkeep_types::{ErrorKind, ShopId, MAX_SHOP_ID_LEN};
use std::str::FromStr;

// ── ShopId ────────────────────────────────────────────────────────

#[test]
fn shop_id_accepts_typical_ids() {
    for raw in ["S1", "shop_a42e0a33", "recovery-test-01", "ABC_def-123"] {
        let id = ShopId::parse(raw).unwrap();
        assert_eq!(id.as_str(), raw);
        assert_eq!(id.to_string(), raw);
    }
}

#[test]
fn shop_id_rejects_empty() {
    let err = ShopId::parse("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn shop_id_rejects_too_long() {
    let raw = "a".repeat(MAX_SHOP_ID_LEN + 1);
    assert!(ShopId::parse(&raw).is_err());
    assert!(ShopId::parse(&"a".repeat(MAX_SHOP_ID_LEN)).is_ok());
}

#[test]
fn shop_id_rejects_separators_and_unicode() {
    for raw in ["shop 1", "shop/1", "../etc", "shöp", "shop.1"] {
        assert!(ShopId::parse(raw).is_err(), "{raw} should be rejected");
    }
}

#[test]
fn shop_id_is_case_sensitive() {
    assert_ne!(ShopId::parse("shop").unwrap(), ShopId::parse("SHOP").unwrap());
}

#[test]
fn shop_id_from_str() {
    let id = ShopId::from_str("S2").unwrap();
    assert_eq!(id.as_ref(), "S2");
}

#[test]
fn shop_id_serde_is_transparent() {
    let id = ShopId::parse("S1").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"S1\"");
    let back: ShopId = serde_json::from_str("\"S1\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn shop_id_deserialize_validates() {
    assert!(serde_json::from_str::<ShopId>("\"bad id\"").is_err());
}

proptest! {
    #[test]
    fn valid_charset_always_parses(raw in "[A-Za-z0-9_-]{1,64}") {
        prop_assert!(ShopId::parse(&raw).is_ok());
    }
}
