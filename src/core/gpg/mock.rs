//! In-process backend for unit tests.
//!
//! "Ciphertext" is a marker line, the comma-separated recipients and the
//! cleartext, written to disk like the real thing so directory walks see
//! ordinary files.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{check_encrypt_preconditions, CryptoBackend, GpgOptions};
use crate::error::{GpgError, Result};

const MAGIC: &[u8] = b"MOCKPGP\n";

pub(crate) fn seal(recipients: &[&str], cleartext: &[u8]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(recipients.join(",").as_bytes());
    out.push(b'\n');
    out.extend_from_slice(cleartext);
    out
}

/// Recipients and cleartext of a sealed file, `None` if it is not one.
pub(crate) fn open(bytes: &[u8]) -> Option<(Vec<String>, Vec<u8>)> {
    let rest = bytes.strip_prefix(MAGIC)?;
    let split = rest.iter().position(|b| *b == b'\n')?;
    let recipients = String::from_utf8_lossy(&rest[..split])
        .split(',')
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    Some((recipients, rest[split + 1..].to_vec()))
}

/// Recipients of a sealed file on disk.
pub(crate) fn recipients_of(path: &Path) -> Vec<String> {
    let bytes = std::fs::read(path).expect("sealed file is readable");
    open(&bytes).expect("file is sealed").0
}

#[derive(Default)]
pub(crate) struct MockBackend {
    /// Keys we hold the secret half of.
    secret_keys: Vec<String>,
    /// Keys encryption accepts; everything when empty.
    public_keys: Vec<String>,
    /// User ids reported by `list_keys`.
    pub uids: Vec<String>,
    pub decrypts: RefCell<Vec<(PathBuf, GpgOptions)>>,
    pub encrypts: RefCell<Vec<(Option<PathBuf>, GpgOptions)>>,
    pub imports: RefCell<Vec<Vec<PathBuf>>>,
}

impl MockBackend {
    pub fn with_secret_keys(keys: &[&str]) -> Self {
        Self {
            secret_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn public_keys(mut self, keys: &[&str]) -> Self {
        self.public_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_uids(mut self, uids: &[&str]) -> Self {
        self.uids = uids.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn invocations(&self) -> usize {
        self.decrypts.borrow().len() + self.encrypts.borrow().len() + self.imports.borrow().len()
    }

    fn read(&self, path: &Path) -> Result<(Vec<String>, Vec<u8>)> {
        if path.is_dir() {
            return Err(GpgError::NotAFile(path.to_path_buf()).into());
        }
        let bytes = std::fs::read(path).map_err(|_| GpgError::FileNotFound(path.to_path_buf()))?;
        open(&bytes).ok_or_else(|| GpgError::InvalidCiphertext(path.to_path_buf()).into())
    }
}

impl CryptoBackend for MockBackend {
    fn version(&self) -> u8 {
        2
    }

    fn list_packets(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.read(path)?.0)
    }

    fn decrypt(&self, path: &Path, options: &GpgOptions) -> Result<Vec<u8>> {
        self.decrypts
            .borrow_mut()
            .push((path.to_path_buf(), options.clone()));
        let (recipients, cleartext) = self.read(path)?;
        if !recipients.iter().any(|r| self.secret_keys.contains(r)) {
            return Err(GpgError::NoSecretKey.into());
        }
        Ok(cleartext)
    }

    fn encrypt(
        &self,
        cleartext: &[u8],
        recipients: &[String],
        destination: Option<&Path>,
        options: &GpgOptions,
    ) -> Result<Option<Vec<u8>>> {
        check_encrypt_preconditions(recipients, destination)?;
        self.encrypts
            .borrow_mut()
            .push((destination.map(Path::to_path_buf), options.clone()));

        if !self.public_keys.is_empty() && recipients.iter().any(|r| !self.public_keys.contains(r))
        {
            return Err(GpgError::NoPublicKey.into());
        }
        let names: Vec<&str> = recipients.iter().map(String::as_str).collect();
        let sealed = seal(&names, cleartext);
        match destination {
            Some(dest) => {
                std::fs::write(dest, sealed)?;
                Ok(None)
            }
            None => Ok(Some(sealed)),
        }
    }

    fn list_keys(&self, _secret: bool) -> Result<Vec<String>> {
        Ok(self.uids.clone())
    }

    fn import(&self, files: &[PathBuf]) -> Result<()> {
        self.imports.borrow_mut().push(files.to_vec());
        Ok(())
    }
}

/// Backend whose ciphertexts live in a map keyed by path, for walks over
/// `MemoryTree` where nothing exists on disk.
#[derive(Default)]
pub(crate) struct MemoryBackend {
    secret_keys: Vec<String>,
    files: RefCell<BTreeMap<PathBuf, (Vec<String>, Vec<u8>)>>,
}

impl MemoryBackend {
    pub fn with_secret_keys(keys: &[&str]) -> Self {
        Self {
            secret_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn file(self, path: &str, recipients: &[&str], cleartext: &str) -> Self {
        self.files.borrow_mut().insert(
            PathBuf::from(path),
            (
                recipients.iter().map(|r| r.to_string()).collect(),
                cleartext.as_bytes().to_vec(),
            ),
        );
        self
    }

    pub fn recipients_of(&self, path: &str) -> Vec<String> {
        self.files.borrow()[Path::new(path)].0.clone()
    }

    fn read(&self, path: &Path) -> Result<(Vec<String>, Vec<u8>)> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| GpgError::FileNotFound(path.to_path_buf()).into())
    }
}

impl CryptoBackend for MemoryBackend {
    fn version(&self) -> u8 {
        2
    }

    fn list_packets(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.read(path)?.0)
    }

    fn decrypt(&self, path: &Path, _options: &GpgOptions) -> Result<Vec<u8>> {
        let (recipients, cleartext) = self.read(path)?;
        if !recipients.iter().any(|r| self.secret_keys.contains(r)) {
            return Err(GpgError::NoSecretKey.into());
        }
        Ok(cleartext)
    }

    fn encrypt(
        &self,
        cleartext: &[u8],
        recipients: &[String],
        destination: Option<&Path>,
        _options: &GpgOptions,
    ) -> Result<Option<Vec<u8>>> {
        if recipients.is_empty() {
            return Err(GpgError::NoRecipients.into());
        }
        match destination {
            Some(dest) => {
                self.files
                    .borrow_mut()
                    .insert(dest.to_path_buf(), (recipients.to_vec(), cleartext.to_vec()));
                Ok(None)
            }
            None => {
                let names: Vec<&str> = recipients.iter().map(String::as_str).collect();
                Ok(Some(seal(&names, cleartext)))
            }
        }
    }

    fn list_keys(&self, _secret: bool) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn import(&self, _files: &[PathBuf]) -> Result<()> {
        Ok(())
    }
}
