//! Recipient rotation.
//!
//! Re-encrypts every secret under a directory to a new recipient set.
//! Subdirectories that declare their own recipients are separate
//! compartments and are never touched by an ancestor's rotation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::gpg::{CryptoBackend, GpgOptions};
use crate::core::tree::{is_trust_boundary, Tree};
use crate::error::{GpgError, Result};

/// What a rotation did, in traversal order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Reencryption {
    /// Files now encrypted to the new recipients.
    pub reencrypted: Vec<PathBuf>,
    /// Subdirectories left alone because they own a recipient file.
    pub boundaries: Vec<PathBuf>,
}

/// Re-encrypt the subtree at `root` to `recipients`.
///
/// Secrets directly in `root` are handled first, one at a time, then each
/// subdirectory without its own recipient file is processed the same way
/// with the same options. The first failure stops the walk; files already
/// re-encrypted stay that way.
///
/// # Errors
///
/// `NoRecipients` before anything is touched if `recipients` is empty,
/// otherwise the first listing, decryption or encryption error.
pub fn reencrypt_tree<T, B>(
    tree: &T,
    backend: &B,
    root: &Path,
    recipients: &[String],
    options: &GpgOptions,
) -> Result<Reencryption>
where
    T: Tree + ?Sized,
    B: CryptoBackend + ?Sized,
{
    if recipients.is_empty() {
        return Err(GpgError::NoRecipients.into());
    }
    info!(root = %root.display(), ?recipients, "re-encrypting tree");

    let mut summary = Reencryption::default();
    walk(tree, backend, root, recipients, options, &mut summary)?;

    info!(
        files = summary.reencrypted.len(),
        boundaries = summary.boundaries.len(),
        "re-encryption finished"
    );
    Ok(summary)
}

fn walk<T, B>(
    tree: &T,
    backend: &B,
    dir: &Path,
    recipients: &[String],
    options: &GpgOptions,
    summary: &mut Reencryption,
) -> Result<()>
where
    T: Tree + ?Sized,
    B: CryptoBackend + ?Sized,
{
    let entries = tree.list(dir)?;

    for entry in entries.iter().filter(|e| e.is_ciphertext()) {
        let path = dir.join(&entry.name);
        debug!(path = %path.display(), "re-encrypting");
        let cleartext = Zeroizing::new(backend.decrypt(&path, options)?);
        backend.encrypt(&cleartext, recipients, Some(&path), options)?;
        summary.reencrypted.push(path);
    }

    for entry in entries.iter().filter(|e| e.is_dir()) {
        let sub = dir.join(&entry.name);
        if is_trust_boundary(tree, &sub) {
            debug!(dir = %sub.display(), "own recipient file, skipping");
            summary.boundaries.push(sub);
            continue;
        }
        walk(tree, backend, &sub, recipients, options, summary)?;
    }
    Ok(())
}
