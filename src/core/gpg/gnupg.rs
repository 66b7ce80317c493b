//! GnuPG command-line backend.
//!
//! Every operation is one process: build the argument vector, run it,
//! classify what came back.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::process::{Runner, SystemRunner};
use super::{check_encrypt_preconditions, classify, listing, Binary, CryptoBackend, GpgOptions};
use crate::error::Result;

/// Backend driving a resolved gpg binary.
#[derive(Debug)]
pub struct GnuPg<R = SystemRunner> {
    binary: Binary,
    runner: R,
    /// Keyring home applied when a call does not bring its own.
    home: Option<PathBuf>,
}

impl GnuPg<SystemRunner> {
    pub fn new(binary: Binary) -> Self {
        Self::with_runner(binary, SystemRunner)
    }
}

impl<R: Runner> GnuPg<R> {
    pub fn with_runner(binary: Binary, runner: R) -> Self {
        Self {
            binary,
            runner,
            home: None,
        }
    }

    /// Use `home` as the keyring for every call without an explicit one.
    pub fn home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn binary(&self) -> &Binary {
        &self.binary
    }

    fn effective_home<'a>(&'a self, options: &'a GpgOptions) -> Option<&'a Path> {
        options.home.as_deref().or(self.home.as_deref())
    }

    fn homedir_args(home: Option<&Path>) -> Vec<OsString> {
        match home {
            Some(home) => vec!["--homedir".into(), home.into()],
            None => Vec::new(),
        }
    }

    fn run(&self, args: &[OsString], input: Option<&[u8]>) -> Result<super::Captured> {
        let out = self.runner.run(self.binary.path(), args, input)?;
        trace!(
            stdout_len = out.stdout.len(),
            stderr = %String::from_utf8_lossy(&out.stderr),
            "gpg output"
        );
        Ok(out)
    }
}

impl<R: Runner> CryptoBackend for GnuPg<R> {
    fn version(&self) -> u8 {
        self.binary.major()
    }

    fn list_packets(&self, path: &Path) -> Result<Vec<String>> {
        debug!(path = %path.display(), "listing packets");

        let mut args = Self::homedir_args(self.home.as_deref());
        args.extend([
            "--pinentry-mode".into(),
            "cancel".into(),
            "--list-packets".into(),
            path.into(),
        ]);
        let out = self.run(&args, None)?;
        classify::packet_listing(&out, path)?;

        let ids = listing::key_ids(&out.stdout);
        debug!(?ids, "packet recipients");
        Ok(ids)
    }

    fn decrypt(&self, path: &Path, options: &GpgOptions) -> Result<Vec<u8>> {
        debug!(path = %path.display(), home = ?options.home, "decrypting");

        let mut args: Vec<OsString> = vec!["--quiet".into()];
        args.extend(Self::homedir_args(self.effective_home(options)));
        args.extend(options.extra_args.iter().cloned());
        args.extend(["--decrypt".into(), path.into()]);

        let out = self.run(&args, None)?;
        let cleartext = classify::decryption(out, path)?;
        trace!(cleartext_len = cleartext.len(), "decrypted");
        Ok(cleartext)
    }

    fn encrypt(
        &self,
        cleartext: &[u8],
        recipients: &[String],
        destination: Option<&Path>,
        options: &GpgOptions,
    ) -> Result<Option<Vec<u8>>> {
        debug!(
            recipients = ?recipients,
            destination = ?destination,
            home = ?options.home,
            "encrypting"
        );
        check_encrypt_preconditions(recipients, destination)?;

        let home = self.effective_home(options);
        let mut args: Vec<OsString> = vec!["--quiet".into()];
        args.extend(Self::homedir_args(home));
        args.extend([
            "--encrypt".into(),
            "--auto-key-locate".into(),
            "local".into(),
            "--trust-model".into(),
            "always".into(),
        ]);
        for recipient in recipients {
            args.extend(["--recipient".into(), recipient.into()]);
        }

        let out = self.run(&args, Some(cleartext))?;
        let subject = destination.or(home).unwrap_or(Path::new("-"));
        let ciphertext = classify::encryption(out, subject)?;
        trace!(ciphertext_len = ciphertext.len(), "encrypted");

        match destination {
            Some(dest) => {
                std::fs::write(dest, &ciphertext)?;
                Ok(None)
            }
            None => Ok(Some(ciphertext)),
        }
    }

    fn list_keys(&self, secret: bool) -> Result<Vec<String>> {
        debug!(secret, "listing keys");

        let mut args = Self::homedir_args(self.home.as_deref());
        args.push(if secret {
            "--list-secret-keys".into()
        } else {
            "--list-keys".into()
        });
        let out = self.run(&args, None)?;
        Ok(listing::user_ids(&out.stdout))
    }

    fn import(&self, files: &[PathBuf]) -> Result<()> {
        debug!(files = files.len(), "importing keys");

        let mut args = Self::homedir_args(self.home.as_deref());
        args.extend(["--batch".into(), "--import".into()]);
        args.extend(files.iter().map(OsString::from));
        let out = self.run(&args, None)?;
        if !out.success() {
            warn!(
                code = ?out.code,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "key import reported problems"
            );
        }
        Ok(())
    }
}
