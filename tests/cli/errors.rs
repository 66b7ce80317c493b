//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("set-recipients"))
        .stdout(predicate::str::contains("reencrypt"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cellar"));
}

#[test]
fn test_missing_gpg_is_reported_with_hint() {
    let t = Test::init(KEY_ALICE);

    t.cmd()
        .env("PATH", "")
        .args(["show", "anything"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no usable gpg binary"))
        .stderr(predicate::str::contains("install GnuPG 2.x"));
}

#[test]
fn test_pinned_binary_that_does_not_exist() {
    let t = Test::init(KEY_ALICE);
    t.write_config("[gpg]\nbinary = \"/nonexistent/gpg\"\n");

    t.cmd()
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable gpg binary"));
}

#[test]
fn test_set_recipients_requires_keys() {
    let t = Test::init(KEY_ALICE);

    let output = t.cmd().args(["set-recipients", "team"]).output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--verbose", "init", KEY_ALICE])
        .output()
        .unwrap();
    assert_success(&output);
}
