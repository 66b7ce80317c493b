//! Binary discovery.
//!
//! Finds a gpg executable that speaks major version 2. The primary
//! candidate is asked first; a version-1 answer sends us to the secondary
//! candidate, which must report version 2 itself.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use tracing::{debug, error};

use super::process::Runner;
use crate::core::constants;
use crate::error::GpgError;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^gpg \(GnuPG\) ([0-9])\.").expect("version pattern is valid")
});

/// A validated gpg executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    path: PathBuf,
    major: u8,
}

impl Binary {
    pub fn new(path: impl Into<PathBuf>, major: u8) -> Self {
        Self {
            path: path.into(),
            major,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn major(&self) -> u8 {
        self.major
    }
}

/// Parse the major version out of `--version` output.
pub fn parse_major(stdout: &[u8]) -> Option<u8> {
    let text = String::from_utf8_lossy(stdout);
    let first = text.lines().next()?;
    let caps = VERSION_LINE.captures(first)?;
    caps[1].parse().ok()
}

/// Resolves the binary once and hands out the cached result afterwards.
pub struct Resolver<R> {
    runner: R,
    primary: String,
    secondary: String,
    resolved: OnceLock<Binary>,
}

impl<R: Runner> Resolver<R> {
    /// Resolver over the default `gpg` / `gpg2` candidates.
    pub fn new(runner: R) -> Self {
        Self::with_candidates(runner, constants::PRIMARY_BINARY, constants::SECONDARY_BINARY)
    }

    pub fn with_candidates(
        runner: R,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            primary: primary.into(),
            secondary: secondary.into(),
            resolved: OnceLock::new(),
        }
    }

    /// The validated binary.
    ///
    /// The version query runs on the first call only.
    ///
    /// # Errors
    ///
    /// Returns `GpgError::BinaryUnavailable` when neither candidate reports
    /// major version 2. Nothing can be encrypted or decrypted after that.
    pub fn resolve(&self) -> Result<&Binary, GpgError> {
        if let Some(binary) = self.resolved.get() {
            return Ok(binary);
        }
        let binary = self.probe()?;
        Ok(self.resolved.get_or_init(|| binary))
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn probe(&self) -> Result<Binary, GpgError> {
        match self.query(&self.primary)? {
            (path, constants::REQUIRED_MAJOR) => Ok(Binary::new(path, constants::REQUIRED_MAJOR)),
            (_, 1) => {
                debug!(candidate = %self.secondary, "primary is version 1, trying secondary");
                match self.query(&self.secondary)? {
                    (path, constants::REQUIRED_MAJOR) => {
                        Ok(Binary::new(path, constants::REQUIRED_MAJOR))
                    }
                    (_, major) => Err(unsupported(&self.secondary, major)),
                }
            }
            (_, major) => Err(unsupported(&self.primary, major)),
        }
    }

    fn query(&self, name: &str) -> Result<(PathBuf, u8), GpgError> {
        let path = self.runner.locate(name).ok_or_else(|| {
            error!(candidate = %name, "binary not found");
            GpgError::BinaryUnavailable(format!("{} not found on PATH", name))
        })?;

        let args = [OsString::from("--version")];
        let out = self.runner.run(&path, &args, None).map_err(|e| {
            error!(candidate = %name, error = %e, "version query failed");
            GpgError::BinaryUnavailable(format!("{}: {}", name, e))
        })?;

        let major = parse_major(&out.stdout).ok_or_else(|| {
            error!(candidate = %name, "unrecognized version output");
            GpgError::BinaryUnavailable(format!("{}: unrecognized --version output", name))
        })?;
        debug!(candidate = %name, major, "version query");
        Ok((path, major))
    }
}

fn unsupported(name: &str, major: u8) -> GpgError {
    error!(candidate = %name, major, "unsupported gpg version");
    GpgError::BinaryUnavailable(format!(
        "{} reports version {}, version {} is required",
        name,
        major,
        constants::REQUIRED_MAJOR
    ))
}
