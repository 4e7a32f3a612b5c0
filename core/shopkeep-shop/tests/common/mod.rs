//! Shared helpers for shop tests.

#![allow(dead_code)]

use shopkeep_shop::{CreatedShop, NewUser, ShopKeep, ShopKeepConfig, ShopMetadata};
use shopkeep_store::generate_key_file;
use shopkeep_types::{Plan, Role, ShopId};
use std::path::Path;
use tempfile::TempDir;

pub const TEST_COST: u32 = 4;

pub fn config(dir: &Path) -> ShopKeepConfig {
    ShopKeepConfig::new(dir).with_bcrypt_cost(TEST_COST)
}

/// Engine over a fresh temp dir with its own key file.
pub fn temp_shopkeep() -> (TempDir, ShopKeep) {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());
    generate_key_file(cfg.key_file().unwrap()).unwrap();
    let sk = ShopKeep::open(&cfg).unwrap();
    (dir, sk)
}

/// Reopens the engine over an existing directory.
pub fn reopen(dir: &TempDir) -> ShopKeep {
    ShopKeep::open(&config(dir.path())).unwrap()
}

pub fn shop(id: &str) -> ShopId {
    ShopId::parse(id).unwrap()
}

pub fn metadata(name: &str) -> ShopMetadata {
    ShopMetadata::new(name, "Asha Verma", "+91 98200 00000", "12 Market Road, Pune")
}

pub fn user(username: &str, password: &str) -> NewUser {
    NewUser::new(username, password, username.to_uppercase(), Role::Cashier)
}

pub fn issue_license(sk: &ShopKeep, plan: Plan) -> String {
    sk.licenses().issue(plan, false, None).unwrap().key().to_string()
}

/// Issues a starter license and creates `id` with it.
pub fn create_shop(sk: &ShopKeep, id: &str, users: Vec<NewUser>) -> CreatedShop {
    let key = issue_license(sk, Plan::Starter);
    sk.directory()
        .create_shop(&shop(id), metadata(&format!("Shop {id}")), &key, users)
        .unwrap()
}

/// Replaces a table file with a directory so the next save of that
/// table fails while every other table still writes.
pub fn block_table(dir: &Path, file_name: &str) {
    let path = dir.join(file_name);
    if path.is_file() {
        std::fs::remove_file(&path).unwrap();
    }
    std::fs::create_dir_all(path.join("blocker")).unwrap();
}
