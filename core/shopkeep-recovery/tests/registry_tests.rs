mod common;

use common::{shop, temp_registry};
use shopkeep_recovery::{RecoveryError, RecoveryCode};
use shopkeep_types::ErrorKind;

#[test]
fn batch_codes_are_distinct_and_bound_to_shop() {
    let (_dir, registry) = temp_registry();
    let codes = registry.issue_batch(&shop("S1"), 5).unwrap();
    assert_eq!(codes.len(), 5);

    let mut unique = codes.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);

    for code in &codes {
        registry.validate(code.as_str(), &shop("S1")).unwrap();
    }
    assert_eq!(registry.count_available(&shop("S1")), 5);
    assert_eq!(registry.count_available(&shop("S2")), 0);
}

#[test]
fn unknown_code_is_not_found() {
    let (_dir, registry) = temp_registry();
    let err = registry.validate("REC-AAAA-BBBB-CCCC", &shop("S1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn malformed_code_is_not_found() {
    let (_dir, registry) = temp_registry();
    let err = registry.redeem("garbage", &shop("S1")).unwrap_err();
    assert!(matches!(err, RecoveryError::NotFound(_)));
}

#[test]
fn wrong_shop_is_mismatch() {
    let (_dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);

    let err = registry.validate(code.as_str(), &shop("S2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShopMismatch);
    let err = registry.redeem(code.as_str(), &shop("S2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShopMismatch);

    registry.validate(code.as_str(), &shop("S1")).unwrap();
}

#[test]
fn redeem_is_one_time() {
    let (_dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);

    registry.redeem(code.as_str(), &shop("S1")).unwrap();
    let again = registry.redeem(code.as_str(), &shop("S1")).unwrap_err();
    assert_eq!(again.kind(), ErrorKind::AlreadyUsed);
    let validated = registry.validate(code.as_str(), &shop("S1")).unwrap_err();
    assert_eq!(validated.kind(), ErrorKind::AlreadyUsed);
    assert_eq!(registry.count_available(&shop("S1")), 0);
}

#[test]
fn used_code_still_mismatches_for_other_shop() {
    let (_dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);
    registry.redeem(code.as_str(), &shop("S1")).unwrap();

    let err = registry.redeem(code.as_str(), &shop("S2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShopMismatch);
}

#[test]
fn concurrent_redeem_has_exactly_one_winner() {
    let (_dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..12)
            .map(|_| {
                let registry = &registry;
                let code = code.as_str();
                s.spawn(move || registry.redeem(code, &shop("S1")))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(RecoveryError::AlreadyUsed(_))))
            .count(),
        11
    );
}

#[test]
fn failed_write_keeps_code_usable() {
    let (dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);

    std::fs::remove_dir_all(dir.path()).unwrap();
    let err = registry.redeem(code.as_str(), &shop("S1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    registry.validate(code.as_str(), &shop("S1")).unwrap();
}

#[test]
fn rollback_restores_code() {
    let (_dir, registry) = temp_registry();
    let code = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);
    registry.redeem(code.as_str(), &shop("S1")).unwrap();

    registry.rollback_redemption(code.as_str(), &shop("S1")).unwrap();
    registry.validate(code.as_str(), &shop("S1")).unwrap();

    let err = registry.rollback_redemption(code.as_str(), &shop("S1")).unwrap_err();
    assert!(matches!(err, RecoveryError::NotRedeemed(_)));
}

#[test]
fn discard_batch_removes_codes() {
    let (_dir, registry) = temp_registry();
    let keep = registry.issue_batch(&shop("S1"), 2).unwrap();
    let discard = registry.issue_batch(&shop("S2"), 3).unwrap();

    registry.discard_batch(&discard).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.count_available(&shop("S2")), 0);
    for code in &discard {
        assert_eq!(
            registry.validate(code.as_str(), &shop("S2")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
    registry.validate(keep[0].as_str(), &shop("S1")).unwrap();
}

#[test]
fn errors_never_include_full_code() {
    let (_dir, registry) = temp_registry();
    let code: RecoveryCode = registry.issue_batch(&shop("S1"), 1).unwrap().remove(0);
    registry.redeem(code.as_str(), &shop("S1")).unwrap();

    let message = registry
        .redeem(code.as_str(), &shop("S1"))
        .unwrap_err()
        .to_string();
    assert!(!message.contains(code.as_str()));
    assert!(message.contains(&code.masked()));
}
