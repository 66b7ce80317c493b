//! Line extraction for `--list-packets` and `--list-keys` output.

use std::sync::LazyLock;

use regex::bytes::Regex;

static KEY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"keyid ([0-9A-Fa-f]{16})").expect("keyid pattern is valid"));

static UID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^uid\s+\[.+\]\s(.*)$").expect("uid pattern is valid"));

/// Key ids named by packets, one per matching line, in output order.
pub fn key_ids(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == b'\n')
        .filter_map(|line| KEY_ID.captures(line))
        .map(|caps| String::from_utf8_lossy(&caps[1]).into_owned())
        .collect()
}

/// User ids with a validity bracket, one per matching line, in output order.
pub fn user_ids(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter_map(|line| UID.captures(line))
        .map(|caps| String::from_utf8_lossy(&caps[1]).into_owned())
        .collect()
}
