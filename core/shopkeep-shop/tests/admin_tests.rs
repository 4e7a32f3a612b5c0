mod common;

use common::{create_shop, reopen, shop, temp_shopkeep, user};
use pretty_assertions::assert_eq;
use shopkeep_shop::{AdminCredentials, AdminError, ShopKeep, SUPER_ADMIN_ROLE};
use shopkeep_types::{ErrorKind, Plan};

const ADMIN_KEY: &str = "ak_7f3e9b21";

fn with_admin(sk: &ShopKeep) -> AdminCredentials {
    sk.admin()
        .add_account(ADMIN_KEY, "root", "Operator", "s3cret!")
        .unwrap();
    AdminCredentials::new(ADMIN_KEY, "root", "s3cret!")
}

// ── authentication ───────────────────────────────────────────────

#[test]
fn admin_authenticates_with_all_three_factors() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);

    let summary = sk.admin().authenticate(&creds).unwrap();
    assert_eq!(summary.username, "root");
    assert_eq!(summary.display_name, "Operator");
    assert_eq!(summary.role, SUPER_ADMIN_ROLE);
}

#[test]
fn unknown_admin_key_is_unauthorized() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);

    let err = sk
        .admin()
        .authenticate(&AdminCredentials::new("ak_wrong", "root", "s3cret!"))
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidAdminKey));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn wrong_username_or_password_is_invalid_credentials() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);

    for creds in [
        AdminCredentials::new(ADMIN_KEY, "root", "wrong"),
        AdminCredentials::new(ADMIN_KEY, "someone", "s3cret!"),
    ] {
        let err = sk.admin().authenticate(&creds).unwrap_err();
        assert!(matches!(err, AdminError::InvalidCredentials));
        assert!(err.is_auth_failure());
    }
}

#[test]
fn admin_password_is_not_stored_in_plaintext() {
    let (dir, sk) = temp_shopkeep();
    with_admin(&sk);
    let raw = std::fs::read(dir.path().join("admin_accounts.dat")).unwrap();
    let needle = b"s3cret!";
    assert!(!raw.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn credentials_debug_is_redacted() {
    let creds = AdminCredentials::new(ADMIN_KEY, "root", "s3cret!");
    let debug = format!("{creds:?}");
    assert!(!debug.contains("s3cret!"));
    assert!(!debug.contains(ADMIN_KEY));
}

// ── account management ───────────────────────────────────────────

#[test]
fn duplicate_admin_key_is_conflict() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);
    let err = sk
        .admin()
        .add_account(ADMIN_KEY, "other", "Other", "pw")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn invalid_admin_input_is_rejected() {
    let (_dir, sk) = temp_shopkeep();
    for (key, name, pw) in [("", "root", "pw"), ("a b", "root", "pw"), ("ak", "", "pw"), ("ak", "root", "")] {
        let err = sk.admin().add_account(key, name, "X", pw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{key:?} {name:?}");
    }
    assert!(sk.admin().is_empty());
}

#[test]
fn change_password_requires_current_password() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);

    let err = sk
        .admin()
        .change_password(ADMIN_KEY, "wrong", "n3w")
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidCredentials));

    sk.admin().change_password(ADMIN_KEY, "s3cret!", "n3w").unwrap();
    assert!(sk
        .admin()
        .authenticate(&AdminCredentials::new(ADMIN_KEY, "root", "s3cret!"))
        .is_err());
    let summary = sk
        .admin()
        .authenticate(&AdminCredentials::new(ADMIN_KEY, "root", "n3w"))
        .unwrap();
    assert!(summary.password_changed_at.is_some());
}

#[test]
fn remove_account_revokes_access() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);

    sk.admin().remove_account(ADMIN_KEY).unwrap();
    assert!(matches!(
        sk.admin().authenticate(&creds).unwrap_err(),
        AdminError::InvalidAdminKey
    ));
    assert!(matches!(
        sk.admin().remove_account(ADMIN_KEY).unwrap_err(),
        AdminError::AccountNotFound
    ));
}

#[test]
fn accounts_survive_reopen() {
    let (dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    drop(sk);

    let sk = reopen(&dir);
    assert_eq!(sk.admin().list().len(), 1);
    sk.admin().authenticate(&creds).unwrap();
}

// ── privileged operations ────────────────────────────────────────

#[test]
fn admin_resets_shop_credentials_without_recovery_code() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    create_shop(&sk, "S1", vec![user("bob", "p1")]);

    let summary = sk
        .admin()
        .reset_shop_credentials(&creds, &shop("S1"), "bob", "bobby", "p9")
        .unwrap();
    assert_eq!(summary.username, "bobby");
    sk.directory().authenticate(&shop("S1"), "bobby", "p9").unwrap();
    assert_eq!(sk.recovery().count_available(&shop("S1")), 5);
}

#[test]
fn reset_requires_valid_admin() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);
    create_shop(&sk, "S1", vec![user("bob", "p1")]);

    let bad = AdminCredentials::new(ADMIN_KEY, "root", "nope");
    assert!(sk
        .admin()
        .reset_shop_credentials(&bad, &shop("S1"), "bob", "bob", "p2")
        .is_err());
    sk.directory().authenticate(&shop("S1"), "bob", "p1").unwrap();
}

#[test]
fn reset_reports_missing_shop_and_user() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    create_shop(&sk, "S1", vec![]);

    let err = sk
        .admin()
        .reset_shop_credentials(&creds, &shop("nope"), "bob", "bob", "p2")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = sk
        .admin()
        .reset_shop_credentials(&creds, &shop("S1"), "bob", "bob", "p2")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn search_and_details_require_authentication() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    create_shop(&sk, "S1", vec![user("bob", "p1")]);

    let results = sk.admin().search_shops(&creds, "shop s1").unwrap();
    assert_eq!(results.count, 1);

    let details = sk.admin().shop_details(&creds, &shop("S1")).unwrap();
    assert_eq!(details.users.len(), 1);
    assert_eq!(details.recovery_codes_available, 5);

    let bad = AdminCredentials::new("nope", "root", "s3cret!");
    assert!(sk.admin().search_shops(&bad, "").is_err());
    assert!(sk.admin().shop_details(&bad, &shop("S1")).is_err());
}

#[test]
fn issue_license_needs_only_admin_key() {
    let (_dir, sk) = temp_shopkeep();
    with_admin(&sk);

    let record = sk.admin().issue_license(ADMIN_KEY, Plan::Premium).unwrap();
    assert!(record.generated_by_admin());
    assert_eq!(sk.licenses().validate(record.key()).unwrap(), Plan::Premium);

    let err = sk.admin().issue_license("nope", Plan::Premium).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn replacement_license_is_hinted_but_not_attached() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    create_shop(&sk, "S1", vec![]);
    let original = sk.directory().get_shop(&shop("S1")).unwrap().license_key;

    let record = sk
        .admin()
        .issue_replacement_license(&creds, Some(&shop("S1")), Plan::Ultimate)
        .unwrap();
    assert_eq!(record.assigned_shop_hint(), Some(&shop("S1")));
    assert!(!record.is_used());
    assert_eq!(sk.directory().get_shop(&shop("S1")).unwrap().license_key, original);
}

#[test]
fn replacement_license_for_unknown_shop_is_not_found() {
    let (_dir, sk) = temp_shopkeep();
    let creds = with_admin(&sk);
    let before = sk.licenses().len();

    let err = sk
        .admin()
        .issue_replacement_license(&creds, Some(&shop("ghost")), Plan::Basic)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(sk.licenses().len(), before);

    sk.admin()
        .issue_replacement_license(&creds, None, Plan::Basic)
        .unwrap();
}
