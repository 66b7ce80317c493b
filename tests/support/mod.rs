//! Test support utilities for cellar integration tests.
//!
//! Provides an isolated store, home and keyring per test plus helper
//! commands.

#![allow(dead_code)]

pub mod commands;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// No process-global state is mutated; every child process gets its
/// paths through environment variables so tests can run in parallel.
pub struct Test {
    /// Temporary home directory (also holds the config dir)
    pub home: TempDir,
    /// Parent of the store root
    pub dir: TempDir,
}

impl Test {
    /// Create a new environment without a store.
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { home, dir }
    }

    /// Create an environment with a store owned by `key_id`.
    pub fn init(key_id: &str) -> Self {
        let t = Self::new();
        let output = t.init_cmd(key_id);
        assert!(
            output.status.success(),
            "Failed to initialize store: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Store root handed to the binary.
    pub fn store(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    /// Path of the store's root recipient file.
    pub fn gpg_id(&self) -> PathBuf {
        self.store().join(".gpg-id")
    }

    /// Config file location under the temporary home.
    pub fn config_path(&self) -> PathBuf {
        self.home.path().join(".config").join("cellar").join("config.toml")
    }

    pub fn write_config(&self, contents: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.store().join(relative)).expect("failed to read store file")
    }
}
