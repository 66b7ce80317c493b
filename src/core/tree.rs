//! Directory listing over the store tree.
//!
//! Re-encryption walks directories through `Tree` rather than `std::fs`
//! directly, so traversal and the trust-boundary check can run against
//! an in-memory tree.

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::core::constants::{CIPHER_EXTENSION, RECIPIENT_FILE};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// A symbolic link to a directory. Never descended into.
    Link,
}

/// A direct child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// A file following the ciphertext naming convention.
    pub fn is_ciphertext(&self) -> bool {
        self.kind == EntryKind::File && self.name.to_string_lossy().ends_with(CIPHER_EXTENSION)
    }
}

pub trait Tree {
    /// Direct children of `dir`, sorted by name.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>>;

    fn is_file(&self, path: &Path) -> bool;
}

/// Does `dir` declare its own recipients?
///
/// Such a directory is a trust boundary: rotating an ancestor's
/// recipients must leave it alone.
pub fn is_trust_boundary<T: Tree + ?Sized>(tree: &T, dir: &Path) -> bool {
    tree.is_file(&dir.join(RECIPIENT_FILE))
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskTree;

impl Tree for DiskTree {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_symlink() && entry.path().is_dir() {
                debug!(path = %entry.path().display(), "not following directory link");
                EntryKind::Link
            } else {
                EntryKind::File
            };
            entries.push(Entry {
                name: entry.file_name(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
