//! Recipient files.
//!
//! A `.gpg-id` file lists, one per line, the key identifiers every secret
//! in its directory is encrypted to. Subdirectories without their own
//! `.gpg-id` inherit it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants::RECIPIENT_FILE;
use crate::error::{Result, StoreError};

/// Read identifiers from a recipient file.
///
/// One identifier per non-empty line, line terminators stripped, order
/// and duplicates preserved.
pub fn read(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    let recipients: Vec<String> = contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    debug!(path = %path.display(), ?recipients, "read recipients");
    Ok(recipients)
}

/// Replace a recipient file with one identifier per line.
pub fn write<S: AsRef<str>>(path: &Path, recipients: &[S]) -> Result<()> {
    let mut contents = String::new();
    for recipient in recipients {
        // writing to a String cannot fail
        let _ = writeln!(contents, "{}", recipient.as_ref());
    }
    debug!(path = %path.display(), count = recipients.len(), "writing recipients");
    std::fs::write(path, contents)?;
    Ok(())
}

/// Recipient file owned by `dir` (whether or not it exists).
pub fn file_in(dir: &Path) -> PathBuf {
    dir.join(RECIPIENT_FILE)
}

/// Nearest recipient file governing `dir`, searching up to `root`.
///
/// # Errors
///
/// `StoreError::OutsideStore` if `dir` is not below `root`, and
/// `StoreError::NoRecipientFile` if no directory on the way has one.
pub fn find(root: &Path, dir: &Path) -> Result<PathBuf> {
    if !dir.starts_with(root) {
        return Err(StoreError::OutsideStore {
            path: dir.to_path_buf(),
            root: root.to_path_buf(),
        }
        .into());
    }

    for ancestor in dir.ancestors() {
        let candidate = file_in(ancestor);
        if candidate.is_file() {
            debug!(dir = %dir.display(), found = %candidate.display(), "governing recipient file");
            return Ok(candidate);
        }
        if ancestor == root {
            break;
        }
    }
    Err(StoreError::NoRecipientFile(dir.to_path_buf()).into())
}
