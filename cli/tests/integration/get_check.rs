//! Integration tests for `keyhole get` and `keyhole check` across backends.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;

use crate::fixtures::{Sandbox, keyhole, path_with};

// ---------------------------------------------------------------------------
// env / file
// ---------------------------------------------------------------------------

#[test]
fn test_get_env_prints_value_without_newline() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["get", "env:KH_TEST_PAT"])
        .env("KH_TEST_PAT", "pat-123")
        .assert()
        .success()
        .stdout("pat-123");
}

#[test]
fn test_get_missing_env_is_not_found_with_hint() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["get", "env:KH_TEST_UNSET"])
        .env_remove("KH_TEST_UNSET")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("Error: secret not found: env:KH_TEST_UNSET"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_get_private_file_trims_one_newline() {
    let sandbox = Sandbox::new();
    let path = sandbox.secret_file("token", "file-secret\n", 0o600);
    keyhole(&sandbox)
        .args(["get", &format!("file:{}", path.display())])
        .assert()
        .success()
        .stdout("file-secret");
}

#[test]
fn test_get_world_readable_file_is_permission_denied() {
    let sandbox = Sandbox::new();
    let path = sandbox.secret_file("loose", "x", 0o644);
    keyhole(&sandbox)
        .args(["get", &format!("file:{}", path.display())])
        .assert()
        .code(4)
        .stdout("")
        .stderr(predicate::str::contains(format!(
            "hint: fix permissions: chmod 600 {}",
            path.display()
        )));
}

#[test]
fn test_get_invalid_reference_exits_five() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["get", "pass:../../etc/shadow"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("invalid reference"));
}

#[test]
fn test_get_json_error_object() {
    let sandbox = Sandbox::new();
    let assert = keyhole(&sandbox)
        .args(["--json", "get", "env:KH_TEST_UNSET"])
        .env_remove("KH_TEST_UNSET")
        .assert()
        .code(2);
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stderr).unwrap();
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "not_found");
    assert!(v["hint"].is_string());
}

#[test]
fn test_get_alias_resolves_through_config() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["config", "set", "aliases.pat", "env:KH_ALIAS_TARGET"])
        .assert()
        .success();
    keyhole(&sandbox)
        .args(["get", "@pat"])
        .env("KH_ALIAS_TARGET", "via-alias")
        .assert()
        .success()
        .stdout("via-alias");
}

// ---------------------------------------------------------------------------
// pass (fake script on PATH)
// ---------------------------------------------------------------------------

#[test]
fn test_get_pass_entry_and_field() {
    let sandbox = Sandbox::new();
    let (store, bin) = sandbox.pass_store();
    keyhole(&sandbox)
        .args(["get", "pass:work/ado"])
        .env("PATH", path_with(&bin))
        .env("PASSWORD_STORE_DIR", &store)
        .assert()
        .success()
        .stdout("s3cret");
    keyhole(&sandbox)
        .args(["get", "pass:work/ado#user"])
        .env("PATH", path_with(&bin))
        .env("PASSWORD_STORE_DIR", &store)
        .assert()
        .success()
        .stdout("dev");
}

#[test]
fn test_get_pass_missing_entry_is_not_found() {
    let sandbox = Sandbox::new();
    let (store, bin) = sandbox.pass_store();
    keyhole(&sandbox)
        .args(["get", "pass:work/unknown"])
        .env("PATH", path_with(&bin))
        .env("PASSWORD_STORE_DIR", &store)
        .assert()
        .code(2);
}

#[test]
fn test_get_pass_expired_key_suggests_rotation() {
    let sandbox = Sandbox::new();
    let (store, bin) = sandbox.pass_store();
    keyhole(&sandbox)
        .args(["get", "pass:work/expired"])
        .env("PATH", path_with(&bin))
        .env("PASSWORD_STORE_DIR", &store)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("hint: rotate the key"));
}

#[test]
fn test_get_pass_loose_store_is_refused() {
    use std::os::unix::fs::PermissionsExt;
    let sandbox = Sandbox::new();
    let (store, bin) = sandbox.pass_store();
    std::fs::set_permissions(&store, std::fs::Permissions::from_mode(0o755)).unwrap();
    keyhole(&sandbox)
        .args(["get", "pass:work/ado"])
        .env("PATH", path_with(&bin))
        .env("PASSWORD_STORE_DIR", &store)
        .assert()
        .code(4)
        .stdout("")
        .stderr(predicate::str::contains("chmod 700"));
}

#[test]
fn test_get_pass_store_from_config() {
    let sandbox = Sandbox::new();
    let (store, bin) = sandbox.pass_store();
    keyhole(&sandbox)
        .args(["config", "set", "pass.store_dir", store.to_str().unwrap()])
        .assert()
        .success();
    keyhole(&sandbox)
        .args(["get", "pass:work/ado"])
        .env("PATH", path_with(&bin))
        .assert()
        .success()
        .stdout("s3cret");
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn test_check_reports_each_reference_and_never_the_value() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["check", "env:KH_CHECK_OK", "env:KH_CHECK_MISSING", "pass:/abs"])
        .env("KH_CHECK_OK", "hidden-value")
        .env_remove("KH_CHECK_MISSING")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("✓ env:KH_CHECK_OK"))
        .stdout(predicate::str::contains("✗ env:KH_CHECK_MISSING"))
        .stdout(predicate::str::contains("✗ pass:/abs"))
        .stdout(predicate::str::contains("hidden-value").not());
}

#[test]
fn test_check_all_ok_exits_zero() {
    let sandbox = Sandbox::new();
    keyhole(&sandbox)
        .args(["check", "env:KH_CHECK_A", "env:KH_CHECK_B"])
        .env("KH_CHECK_A", "a")
        .env("KH_CHECK_B", "b")
        .assert()
        .success();
}

#[test]
fn test_check_json_results() {
    let sandbox = Sandbox::new();
    let assert = keyhole(&sandbox)
        .args(["--json", "check", "env:KH_CHECK_A", "file:relative/path"])
        .env("KH_CHECK_A", "a")
        .assert()
        .code(5);
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["ok"], false);
    assert_eq!(v["results"][0]["ok"], true);
    assert_eq!(v["results"][1]["code"], "invalid_reference");
}
