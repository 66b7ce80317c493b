//! Shared public keys.
//!
//! A store may carry exported public keys under `.available-keys` so a
//! fresh checkout can encrypt to every team member without fetching keys
//! by hand.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::constants::KEY_DIR;
use crate::core::gpg::CryptoBackend;
use crate::error::Result;

/// Directory holding shareable key files for a store.
pub fn key_dir(store_root: &Path) -> PathBuf {
    store_root.join(KEY_DIR)
}

/// Regular files in the store's key directory, sorted by name.
///
/// A missing key directory yields an empty list.
pub fn available_key_files(store_root: &Path) -> Result<Vec<PathBuf>> {
    let dir = key_dir(store_root);
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no key directory");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Import every shared key in one backend call.
///
/// Returns the files handed to the backend; nothing is invoked when there
/// are none.
pub fn import_keys<B: CryptoBackend + ?Sized>(backend: &B, store_root: &Path) -> Result<Vec<PathBuf>> {
    let files = available_key_files(store_root)?;
    if files.is_empty() {
        return Ok(files);
    }
    info!(count = files.len(), "importing shared keys");
    backend.import(&files)?;
    Ok(files)
}
