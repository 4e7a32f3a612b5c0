use proptest::prelude::*;
use shopkeep_recovery::{RecoveryCode, CODE_ALPHABET};

#[test]
fn generated_code_has_expected_shape() {
    let code = RecoveryCode::generate();
    let s = code.as_str();
    assert_eq!(s.len(), "REC-XXXX-XXXX-XXXX".len());
    assert!(s.starts_with("REC-"));
    for group in s.split('-').skip(1) {
        assert_eq!(group.len(), 4);
        assert!(group.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
}

#[test]
fn alphabet_has_no_lookalikes() {
    assert_eq!(CODE_ALPHABET.len(), 31);
    for c in b"0O1IL" {
        assert!(!CODE_ALPHABET.contains(c));
    }
}

#[test]
fn parse_normalizes_input() {
    let code = RecoveryCode::parse(" rec abcd_efgh-jkmn ").unwrap();
    assert_eq!(code.as_str(), "REC-ABCD-EFGH-JKMN");
}

#[test]
fn parse_rejects_malformed_codes() {
    for bad in [
        "",
        "REC",
        "REC-ABCD-EFGH",
        "REC-ABCD-EFGH-JKMN-PQRS",
        "XYZ-ABCD-EFGH-JKMN",
        "REC-ABC0-EFGH-JKMN",
        "REC-ABCDE-FGH-JKMN",
    ] {
        assert!(RecoveryCode::parse(bad).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn masked_hides_all_but_first_group() {
    let code = RecoveryCode::parse("REC-ABCD-EFGH-JKMN").unwrap();
    assert_eq!(code.masked(), "REC-ABCD-****-****");
    let debug = format!("{code:?}");
    assert!(!debug.contains("EFGH"));
    assert_eq!(code.to_string(), "REC-ABCD-EFGH-JKMN");
}

#[test]
fn serde_uses_plain_string() {
    let code = RecoveryCode::parse("REC-ABCD-EFGH-JKMN").unwrap();
    let json = serde_json::to_string(&code).unwrap();
    assert_eq!(json, "\"REC-ABCD-EFGH-JKMN\"");
    let back: RecoveryCode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, code);
    assert!(serde_json::from_str::<RecoveryCode>("\"nope\"").is_err());
}

proptest! {
    #[test]
    fn generated_codes_always_parse(_seed in 0u8..64) {
        let code = RecoveryCode::generate();
        prop_assert_eq!(RecoveryCode::parse(code.as_str()).unwrap(), code.clone());
        prop_assert_eq!(RecoveryCode::parse(&code.as_str().to_lowercase()).unwrap(), code);
    }
}
