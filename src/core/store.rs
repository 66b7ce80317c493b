//! The password store.
//!
//! `PasswordStore` ties a store root to a backend and exposes the
//! operations the CLI needs: reading and writing secrets, inspecting and
//! changing the recipients of a directory, and importing shared keys.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::constants::CIPHER_EXTENSION;
use crate::core::gpg::{CryptoBackend, GpgOptions};
use crate::core::reencrypt::{reencrypt_tree, Reencryption};
use crate::core::tree::DiskTree;
use crate::core::{keys, recipients, relocate};
use crate::error::{Error, GpgError, Result, StoreError};

/// Create a store at `root` owned by `key_id`.
///
/// Writes the root recipient file; the directory is created if needed.
///
/// # Errors
///
/// Returns `StoreError::AlreadyInitialized` if the root already has a
/// recipient file.
pub fn init(root: &Path, key_id: &str) -> Result<PathBuf> {
    let gpg_id = recipients::file_in(root);
    if gpg_id.exists() {
        return Err(StoreError::AlreadyInitialized(root.to_path_buf()).into());
    }
    std::fs::create_dir_all(root)?;
    recipients::write(&gpg_id, &[key_id])?;
    info!(root = %root.display(), key_id, "initialized store");
    Ok(gpg_id)
}

/// Keys known to the keyring next to the keys a directory is encrypted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientView {
    /// User ids of every public key in the keyring.
    pub available: Vec<String>,
    /// Entries of the governing recipient file.
    pub authorized: Vec<String>,
}

pub struct PasswordStore<B> {
    root: PathBuf,
    backend: B,
    options: GpgOptions,
}

impl<B> std::fmt::Debug for PasswordStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordStore")
            .field("root", &self.root)
            .field("options", &self.options)
            .finish()
    }
}

impl<B: CryptoBackend> PasswordStore<B> {
    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>, backend: B) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotInitialized(root).into());
        }
        debug!(root = %root.display(), "opened store");
        Ok(Self {
            root,
            backend,
            options: GpgOptions::default(),
        })
    }

    /// Options passed to every decryption and encryption.
    pub fn with_options(mut self, options: GpgOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ciphertext path for a secret name like `team/db`.
    ///
    /// # Errors
    ///
    /// `StoreError::OutsideStore` for absolute names or names with `..`,
    /// `StoreError::SecretNotFound` for names that denote the root itself.
    pub fn secret_path(&self, name: &str) -> Result<PathBuf> {
        let stem = name.strip_suffix(CIPHER_EXTENSION).unwrap_or(name);
        let resolved = self.resolve(stem)?;
        if resolved == self.root {
            return Err(StoreError::SecretNotFound(name.to_string()).into());
        }
        let mut path = resolved.into_os_string();
        path.push(CIPHER_EXTENSION);
        Ok(PathBuf::from(path))
    }

    /// Directory inside the store; `""` and `"."` name the root.
    pub fn dir(&self, relative: &str) -> Result<PathBuf> {
        self.resolve(relative)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StoreError::OutsideStore {
                path: relative.to_path_buf(),
                root: self.root.clone(),
            }
            .into());
        }
        Ok(relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .fold(self.root.clone(), |acc, c| acc.join(c)))
    }

    /// Recipients governing `dir`, from its nearest recipient file.
    pub fn recipients_for(&self, dir: &Path) -> Result<Vec<String>> {
        let file = recipients::find(&self.root, dir)?;
        recipients::read(&file)
    }

    /// Encrypt `cleartext` as secret `name` to the recipients governing
    /// its directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretExists` if the secret exists and `force`
    /// is false.
    pub fn insert(&self, name: &str, cleartext: &[u8], force: bool) -> Result<PathBuf> {
        let path = self.secret_path(name)?;
        if path.exists() && !force {
            return Err(StoreError::SecretExists(name.to_string()).into());
        }
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();
        let recipients = self.recipients_for(&parent)?;

        std::fs::create_dir_all(&parent)?;
        self.backend
            .encrypt(cleartext, &recipients, Some(&path), &self.options)?;
        info!(name, count = recipients.len(), "stored secret");
        Ok(path)
    }

    /// Decrypt secret `name` as text.
    pub fn show(&self, name: &str) -> Result<Zeroizing<String>> {
        let path = self.secret_path(name)?;
        match self.backend.decrypt_text(&path, &self.options) {
            Ok(text) => Ok(Zeroizing::new(text)),
            Err(Error::Gpg(GpgError::FileNotFound(_))) => {
                Err(StoreError::SecretNotFound(name.to_string()).into())
            }
            Err(e) => Err(e),
        }
    }

    /// Key ids secret `name` is encrypted to.
    pub fn packets(&self, name: &str) -> Result<Vec<String>> {
        let path = self.secret_path(name)?;
        match self.backend.list_packets(&path) {
            Err(Error::Gpg(GpgError::FileNotFound(_))) => {
                Err(StoreError::SecretNotFound(name.to_string()).into())
            }
            other => other,
        }
    }

    pub fn recipient_view(&self, dir: &Path) -> Result<RecipientView> {
        Ok(RecipientView {
            available: self.backend.list_keys(false)?,
            authorized: self.recipients_for(dir)?,
        })
    }

    /// Make `recipients` the recipients of `dir` and re-encrypt its
    /// subtree to them.
    ///
    /// The recipient file is written before re-encryption starts, so a
    /// failed rotation leaves it naming the new set.
    pub fn set_recipients(&self, dir: &Path, recipients: &[String]) -> Result<Reencryption> {
        if recipients.is_empty() {
            return Err(GpgError::NoRecipients.into());
        }
        if !dir.starts_with(&self.root) {
            return Err(StoreError::OutsideStore {
                path: dir.to_path_buf(),
                root: self.root.clone(),
            }
            .into());
        }
        std::fs::create_dir_all(dir)?;
        recipients::write(&recipients::file_in(dir), recipients)?;
        reencrypt_tree(&DiskTree, &self.backend, dir, recipients, &self.options)
    }

    /// Re-encrypt `dir` to the recipients that currently govern it.
    pub fn reencrypt(&self, dir: &Path) -> Result<Reencryption> {
        let recipients = self.recipients_for(dir)?;
        reencrypt_tree(&DiskTree, &self.backend, dir, &recipients, &self.options)
    }

    /// Delete secret `name`.
    pub fn remove(&self, name: &str) -> Result<PathBuf> {
        let path = self.secret_path(name)?;
        if !path.is_file() {
            return Err(StoreError::SecretNotFound(name.to_string()).into());
        }
        std::fs::remove_file(&path)?;
        info!(name, "removed secret");
        Ok(path)
    }

    /// Rename secret `from` to `to`, re-encrypting it when `to` falls
    /// under a different recipient file.
    pub fn move_secret(&self, from: &str, to: &str) -> Result<Reencryption> {
        let source = self.secret_path(from)?;
        let target = self.secret_path(to)?;
        match relocate::move_secret(&self.backend, &self.root, &source, &target, &self.options) {
            Err(Error::Store(StoreError::SecretNotFound(_))) => {
                Err(StoreError::SecretNotFound(from.to_string()).into())
            }
            other => other,
        }
    }

    /// Rename directory `from` to `to`. See [`relocate::move_dir`].
    pub fn move_dir(&self, from: &str, to: &str) -> Result<Reencryption> {
        let source = self.dir(from)?;
        let target = self.dir(to)?;
        relocate::move_dir(&self.backend, &self.root, &source, &target, &self.options)
    }

    /// Create an empty directory, with any missing parents.
    pub fn create_dir(&self, relative: &str) -> Result<PathBuf> {
        let dir = self.dir(relative)?;
        if dir.exists() {
            return Err(StoreError::DestinationExists(dir).into());
        }
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "created directory");
        Ok(dir)
    }

    /// Import the store's shared public keys.
    pub fn refresh(&self) -> Result<Vec<PathBuf>> {
        keys::import_keys(&self.backend, &self.root)
    }
}
