//! Moving secrets and directories inside the store.
//!
//! A secret that ends up under a different recipient file is re-encrypted
//! to the destination's recipients; otherwise it is renamed. A directory
//! that owns a recipient file carries its recipients with it and is
//! always renamed as a whole.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::gpg::{CryptoBackend, GpgOptions};
use crate::core::recipients;
use crate::core::reencrypt::Reencryption;
use crate::core::tree::{is_trust_boundary, DiskTree, Tree};
use crate::error::{Error, Result, StoreError};

/// Governing recipient file of `dir`, `None` if nothing governs it.
fn governing(root: &Path, dir: &Path) -> Result<Option<PathBuf>> {
    match recipients::find(root, dir) {
        Ok(file) => Ok(Some(file)),
        Err(Error::Store(StoreError::NoRecipientFile(_))) => Ok(None),
        Err(e) => Err(e),
    }
}

fn parent_of<'a>(path: &'a Path, root: &'a Path) -> &'a Path {
    path.parent().unwrap_or(root)
}

/// Move one ciphertext file from `from` to `to`.
///
/// # Errors
///
/// `SecretNotFound` if `from` is not a file, `DestinationExists` if `to`
/// exists, and any decryption or encryption error when re-encrypting.
pub fn move_secret<B: CryptoBackend + ?Sized>(
    backend: &B,
    root: &Path,
    from: &Path,
    to: &Path,
    options: &GpgOptions,
) -> Result<Reencryption> {
    if !from.is_file() {
        return Err(StoreError::SecretNotFound(from.display().to_string()).into());
    }
    if to.exists() {
        return Err(StoreError::DestinationExists(to.to_path_buf()).into());
    }
    info!(from = %from.display(), to = %to.display(), "moving secret");

    let mut summary = Reencryption::default();
    relocate_file(backend, root, from, to, options, &mut summary)?;
    Ok(summary)
}

/// Move the directory `from` to `to`, creating missing parents of `to`.
///
/// Secrets whose governing recipient file changes are re-encrypted one by
/// one; subdirectories with their own recipient file are renamed as-is and
/// reported as boundaries. The first failure stops the move.
pub fn move_dir<B: CryptoBackend + ?Sized>(
    backend: &B,
    root: &Path,
    from: &Path,
    to: &Path,
    options: &GpgOptions,
) -> Result<Reencryption> {
    if !from.is_dir() {
        return Err(StoreError::DirNotFound(from.to_path_buf()).into());
    }
    if to.starts_with(from) {
        return Err(StoreError::MoveIntoSelf {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        }
        .into());
    }
    if to.exists() {
        return Err(StoreError::DestinationExists(to.to_path_buf()).into());
    }
    info!(from = %from.display(), to = %to.display(), "moving directory");

    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut summary = Reencryption::default();
    relocate_dir(&DiskTree, backend, root, from, to, options, &mut summary)?;
    Ok(summary)
}

fn relocate_file<B: CryptoBackend + ?Sized>(
    backend: &B,
    root: &Path,
    from: &Path,
    to: &Path,
    options: &GpgOptions,
    summary: &mut Reencryption,
) -> Result<()> {
    let target_dir = parent_of(to, root);
    let source = governing(root, parent_of(from, root))?;
    let target = governing(root, target_dir)?;
    std::fs::create_dir_all(target_dir)?;

    if source == target {
        debug!(from = %from.display(), "same recipients, renaming");
        std::fs::rename(from, to)?;
        return Ok(());
    }

    let target = target.ok_or_else(|| StoreError::NoRecipientFile(target_dir.to_path_buf()))?;
    let new_recipients = recipients::read(&target)?;
    debug!(from = %from.display(), recipients = ?new_recipients, "re-encrypting on move");
    let cleartext = Zeroizing::new(backend.decrypt(from, options)?);
    backend.encrypt(&cleartext, &new_recipients, Some(to), options)?;
    std::fs::remove_file(from)?;
    summary.reencrypted.push(to.to_path_buf());
    Ok(())
}

fn relocate_dir<T, B>(
    tree: &T,
    backend: &B,
    root: &Path,
    from: &Path,
    to: &Path,
    options: &GpgOptions,
    summary: &mut Reencryption,
) -> Result<()>
where
    T: Tree + ?Sized,
    B: CryptoBackend + ?Sized,
{
    if is_trust_boundary(tree, from) {
        debug!(dir = %from.display(), "own recipient file, renaming");
        std::fs::rename(from, to)?;
        summary.boundaries.push(to.to_path_buf());
        return Ok(());
    }
    if governing(root, from)? == governing(root, to)? {
        debug!(dir = %from.display(), "same recipients, renaming");
        std::fs::rename(from, to)?;
        return Ok(());
    }

    std::fs::create_dir(to)?;
    for entry in tree.list(from)? {
        let source = from.join(&entry.name);
        let target = to.join(&entry.name);
        if entry.is_dir() {
            relocate_dir(tree, backend, root, &source, &target, options, summary)?;
        } else if entry.is_ciphertext() {
            relocate_file(backend, root, &source, &target, options, summary)?;
        } else {
            std::fs::rename(&source, &target)?;
        }
    }
    std::fs::remove_dir(from)?;
    Ok(())
}
