//! Tests for `cellar init`.

use crate::support::*;

#[test]
fn test_init_writes_root_recipient_file() {
    let t = Test::new();

    let output = t.init_cmd(KEY_ALICE);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");

    assert_eq!(t.read(".gpg-id"), format!("{}\n", KEY_ALICE));
}

#[test]
fn test_init_creates_missing_store_directory() {
    let t = Test::new();
    assert!(!t.store().exists());

    assert_success(&t.init_cmd(KEY_ALICE));
    assert!(t.store().is_dir());
}

#[test]
fn test_init_twice_fails_and_keeps_recipients() {
    let t = Test::init(KEY_ALICE);

    let output = t.init_cmd(KEY_BOB);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
    assert_eq!(t.read(".gpg-id"), format!("{}\n", KEY_ALICE));
}

#[test]
fn test_init_works_without_gpg_on_path() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("PATH", "")
        .args(["init", KEY_ALICE])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(t.gpg_id().is_file());
}

#[test]
fn test_init_takes_key_id_from_config() {
    let t = Test::new();
    t.write_config(&format!("[gpg]\nuser_key_id = \"{}\"\n", KEY_BOB));

    let output = t.cmd().arg("init").output().unwrap();
    assert_success(&output);
    assert_eq!(t.read(".gpg-id"), format!("{}\n", KEY_BOB));
}

#[test]
fn test_init_without_any_key_id_fails() {
    let t = Test::new();

    let output = t.cmd().arg("init").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "user_key_id");
    assert!(!t.gpg_id().exists());
}

#[test]
fn test_init_remembers_key_id_in_config() {
    let t = Test::new();
    assert!(!t.config_path().exists());

    assert_success(&t.init_cmd(KEY_ALICE));
    let config = std::fs::read_to_string(t.config_path()).unwrap();
    assert!(config.contains(&format!("user_key_id = \"{}\"", KEY_ALICE)), "{}", config);

    // a second store picks the key up without an argument
    let output = t
        .cmd()
        .arg("--store")
        .arg(t.dir.path().join("second"))
        .arg("init")
        .output()
        .unwrap();
    assert_success(&output);
    let second = std::fs::read_to_string(t.dir.path().join("second").join(".gpg-id")).unwrap();
    assert_eq!(second, format!("{}\n", KEY_ALICE));
}

#[test]
fn test_init_keeps_configured_key_id() {
    let t = Test::new();
    t.write_config(&format!("[gpg]\nuser_key_id = \"{}\"\n", KEY_BOB));

    assert_success(&t.init_cmd(KEY_ALICE));
    assert_eq!(t.read(".gpg-id"), format!("{}\n", KEY_ALICE));
    let config = std::fs::read_to_string(t.config_path()).unwrap();
    assert!(config.contains(KEY_BOB), "{}", config);
    assert!(!config.contains(KEY_ALICE), "{}", config);
}
