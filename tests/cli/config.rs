//! Tests for configuration and environment overrides.

use crate::support::*;

#[test]
fn test_store_flag_overrides_environment() {
    let t = Test::new();
    let other = t.dir.path().join("elsewhere");

    let output = t
        .cmd()
        .arg("--store")
        .arg(&other)
        .args(["init", KEY_ALICE])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(other.join(".gpg-id").is_file());
    assert!(!t.gpg_id().exists());
}

#[test]
fn test_config_store_root_is_used_without_override() {
    let t = Test::new();
    let root = t.dir.path().join("from-config");
    t.write_config(&format!("[store]\nroot = {:?}\n", root.display().to_string()));

    let output = t
        .cmd()
        .env_remove("CELLAR_STORE_DIR")
        .args(["init", KEY_ALICE])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(root.join(".gpg-id").is_file());
}

#[test]
fn test_explicit_config_path() {
    let t = Test::new();
    let path = t.dir.path().join("custom.toml");
    std::fs::write(&path, format!("[gpg]\nuser_key_id = \"{}\"\n", KEY_BOB)).unwrap();

    let output = t
        .cmd()
        .arg("--config")
        .arg(&path)
        .arg("init")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(t.read(".gpg-id"), format!("{}\n", KEY_BOB));
}

#[test]
fn test_malformed_config_fails() {
    let t = Test::new();
    t.write_config("[gpg\nbinary = ");

    let output = t.cmd().args(["init", KEY_ALICE]).output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_default_store_is_under_home() {
    let t = Test::new();

    let output = t
        .cmd()
        .env_remove("CELLAR_STORE_DIR")
        .args(["init", KEY_ALICE])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(t.home.path().join(".password-store").join(".gpg-id").is_file());
}
