//! Shared fixtures: an isolated config path and a fake `pass` on `PATH`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// `keyhole` with colors off and a config file that does not exist yet.
pub fn keyhole(sandbox: &Sandbox) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keyhole"));
    cmd.env("NO_COLOR", "1")
        .env("KEYHOLE_CONFIG", sandbox.config_path())
        .env_remove("KEYHOLE_LOG")
        .env_remove("PASSWORD_STORE_DIR");
    cmd
}

/// Temp directory holding the config file, secret files and a password store.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.yaml")
    }

    /// Write `content` to `name` with the given mode.
    pub fn secret_file(&self, name: &str, content: &str, mode: u32) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, content).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    /// A 0700 store with entries `work/ado` and `work/expired`, plus a fake
    /// `pass` script. Returns `(store_dir, bin_dir)`.
    pub fn pass_store(&self) -> (PathBuf, PathBuf) {
        let store = self.path().join("store");
        std::fs::create_dir_all(store.join("work")).unwrap();
        for entry in ["work/ado.gpg", "work/expired.gpg"] {
            std::fs::write(store.join(entry), "ciphertext").unwrap();
        }
        std::fs::set_permissions(&store, std::fs::Permissions::from_mode(0o700)).unwrap();

        let bin = self.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let script = bin.join("pass");
        std::fs::write(&script, FAKE_PASS).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (store, bin)
    }
}

/// `PATH` with `bin` first.
pub fn path_with(bin: &Path) -> String {
    format!(
        "{}:{}",
        bin.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

const FAKE_PASS: &str = r#"#!/bin/sh
[ "$1" = "show" ] || exit 1
[ -n "$PASSWORD_STORE_DIR" ] || { echo "PASSWORD_STORE_DIR not set" >&2; exit 9; }
case "$2" in
  work/ado) printf 's3cret\nuser: dev\n' ;;
  work/expired) echo "gpg: Note: secret key 0xABCD expired" >&2; exit 2 ;;
  *) echo "Error: $2 is not in the password store." >&2; exit 1 ;;
esac
"#;
