//! Integration tests for `keyhole doctor` against a throwaway home directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;

use crate::fixtures::{Sandbox, keyhole};

fn doctor_json(sandbox: &Sandbox) -> (Option<i32>, serde_json::Value) {
    let output = keyhole(sandbox)
        .args(["--json", "doctor"])
        .env("HOME", sandbox.path())
        .env_remove("GNUPGHOME")
        .output()
        .unwrap();
    let v = serde_json::from_slice(&output.stdout).unwrap();
    (output.status.code(), v)
}

fn status<'a>(v: &'a serde_json::Value, name: &str) -> &'a str {
    v["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["status"].as_str())
        .unwrap_or_else(|| panic!("no check {name}"))
}

#[test]
fn test_doctor_empty_home_only_warns() {
    let sandbox = Sandbox::new();
    let (code, v) = doctor_json(&sandbox);
    assert_eq!(code, Some(0), "{v}");
    assert_eq!(v["ok"], true);
    assert_eq!(status(&v, "pass store"), "warn");
    assert_eq!(status(&v, "config file"), "ok");
}

#[test]
fn test_doctor_flags_loose_ssh_key() {
    let sandbox = Sandbox::new();
    let ssh = sandbox.path().join(".ssh");
    std::fs::create_dir(&ssh).unwrap();
    std::fs::set_permissions(&ssh, std::fs::Permissions::from_mode(0o700)).unwrap();
    let key = ssh.join("id_ed25519");
    std::fs::write(&key, "key").unwrap();
    std::fs::set_permissions(&key, std::fs::Permissions::from_mode(0o644)).unwrap();

    let (code, v) = doctor_json(&sandbox);
    assert_eq!(code, Some(1));
    assert_eq!(v["ok"], false);
    assert_eq!(status(&v, "ssh dir"), "ok");
    assert_eq!(status(&v, "ssh key id_ed25519"), "fail");
}
