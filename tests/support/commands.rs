//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a cellar command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME and XDG_CONFIG_HOME under the temporary home
    /// - CELLAR_STORE_DIR pointing at the test store
    /// - NO_COLOR so output can be matched verbatim
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cellar").expect("failed to find cellar binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("CELLAR_STORE_DIR", self.store());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CELLAR_CONFIG");
        cmd.env_remove("CELLAR_GPG_HOME");
        cmd.env_remove("CELLAR_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `cellar init <key_id>`.
    pub fn init_cmd(&self, key_id: &str) -> Output {
        self.cmd()
            .args(["init", key_id])
            .output()
            .expect("failed to run cellar init")
    }
}
