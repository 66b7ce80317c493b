//! OpenPGP backend.
//!
//! All cryptography is delegated to an external gpg binary. This module
//! finds the binary, runs it, and turns its output into typed results.
//!
//! ## Layers
//!
//! - `binary`: resolve a version-2 binary once
//! - `process`: spawn it and capture both streams
//! - `classify`: map diagnostic phrases to `GpgError` kinds
//! - `listing`: pull key ids and user ids out of listings
//! - `gnupg`: the `CryptoBackend` implementation tying them together

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{GpgError, Result};

pub mod binary;
pub mod classify;
mod gnupg;
pub mod listing;
pub mod process;

#[cfg(test)]
pub(crate) mod mock;

pub use binary::{Binary, Resolver};
pub use gnupg::GnuPg;
pub use process::{Captured, Runner, SystemRunner};

/// Per-call knobs for decryption and encryption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpgOptions {
    /// Alternate keyring home (`--homedir`).
    pub home: Option<PathBuf>,
    /// Extra flags for decryption. Only needed by tests and unusual setups.
    pub extra_args: Vec<OsString>,
}

impl GpgOptions {
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
            extra_args: Vec::new(),
        }
    }
}

/// Capabilities the store needs from an OpenPGP implementation.
pub trait CryptoBackend {
    /// Major version of the backend.
    fn version(&self) -> u8;

    /// Key ids a ciphertext file is addressed to, in listing order.
    ///
    /// # Errors
    ///
    /// `FileNotFound`, `NotAFile` or `InvalidCiphertext` for unreadable
    /// input. A ciphertext without recipient packets yields an empty list.
    fn list_packets(&self, path: &Path) -> Result<Vec<String>>;

    /// Decrypt a file with the keys available locally.
    fn decrypt(&self, path: &Path, options: &GpgOptions) -> Result<Vec<u8>>;

    /// Encrypt `cleartext` to every recipient.
    ///
    /// With a destination the ciphertext replaces the file content and
    /// `None` is returned; otherwise the ciphertext is returned.
    ///
    /// # Errors
    ///
    /// `NoRecipients` for an empty recipient list and `FileNotFound` for a
    /// destination whose parent directory is missing, both before the
    /// backend runs.
    fn encrypt(
        &self,
        cleartext: &[u8],
        recipients: &[String],
        destination: Option<&Path>,
        options: &GpgOptions,
    ) -> Result<Option<Vec<u8>>>;

    /// User ids of public (or secret) keys in the keyring.
    fn list_keys(&self, secret: bool) -> Result<Vec<String>>;

    /// Import key material from the given files in one call.
    fn import(&self, files: &[PathBuf]) -> Result<()>;

    /// Decrypt a file and decode it as UTF-8.
    ///
    /// # Errors
    ///
    /// `TextDecode` if the cleartext is not valid UTF-8, in addition to
    /// everything `decrypt` reports.
    fn decrypt_text(&self, path: &Path, options: &GpgOptions) -> Result<String> {
        let bytes = self.decrypt(path, options)?;
        Ok(String::from_utf8(bytes).map_err(GpgError::TextDecode)?)
    }
}

/// Checks shared by every `encrypt` implementation.
pub(crate) fn check_encrypt_preconditions(
    recipients: &[String],
    destination: Option<&Path>,
) -> Result<()> {
    if recipients.is_empty() {
        return Err(GpgError::NoRecipients.into());
    }
    if let Some(dest) = destination {
        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(GpgError::FileNotFound(parent.to_path_buf()).into());
        }
    }
    Ok(())
}
