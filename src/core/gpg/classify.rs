//! Output classification.
//!
//! gpg reports failures as human-readable phrases on its diagnostic
//! stream. Each operation checks an ordered table of phrases; the first
//! match decides the error kind. Order matters because one diagnostic
//! can contain several phrases.

use std::path::Path;
use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::{debug, warn};

use super::process::Captured;
use crate::error::GpgError;

/// Error kinds a diagnostic phrase can signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    FileNotFound,
    NotAFile,
    InvalidCiphertext,
    NoSecretKey,
    NoPublicKey,
}

impl Failure {
    fn into_error(self, subject: &Path) -> GpgError {
        match self {
            Self::FileNotFound => GpgError::FileNotFound(subject.to_path_buf()),
            Self::NotAFile => GpgError::NotAFile(subject.to_path_buf()),
            Self::InvalidCiphertext => GpgError::InvalidCiphertext(subject.to_path_buf()),
            Self::NoSecretKey => GpgError::NoSecretKey,
            Self::NoPublicKey => GpgError::NoPublicKey,
        }
    }
}

type Rules = Vec<(Regex, Failure)>;

fn compile(rules: &[(&str, Failure)]) -> Rules {
    rules
        .iter()
        .map(|(pattern, failure)| {
            (
                Regex::new(pattern).expect("classifier pattern is valid"),
                *failure,
            )
        })
        .collect()
}

/// Phrases for reading a ciphertext file, in priority order.
static FILE_RULES: LazyLock<Rules> = LazyLock::new(|| {
    compile(&[
        (r"can't open.*No such file or directory", Failure::FileNotFound),
        (r"can't open", Failure::FileNotFound),
        (r"read error: Is a directory", Failure::NotAFile),
        (r"no valid OpenPGP data found", Failure::InvalidCiphertext),
    ])
});

/// File phrases plus the missing secret key.
static DECRYPT_RULES: LazyLock<Rules> = LazyLock::new(|| {
    let mut rules = FILE_RULES.clone();
    rules.extend(compile(&[(
        r"decryption failed: No secret key",
        Failure::NoSecretKey,
    )]));
    rules
});

static ENCRYPT_RULES: LazyLock<Rules> = LazyLock::new(|| {
    compile(&[
        (r"No such file or directory", Failure::FileNotFound),
        (r"No public key", Failure::NoPublicKey),
    ])
});

fn first_match(rules: &Rules, stream: &[u8]) -> Option<Failure> {
    rules
        .iter()
        .find(|(pattern, _)| pattern.is_match(stream))
        .map(|(_, failure)| *failure)
}

/// Match a diagnostic stream against the decrypt phrase table.
pub fn match_diagnostic(stderr: &[u8]) -> Option<Failure> {
    first_match(&DECRYPT_RULES, stderr)
}

/// Classify a decryption.
///
/// Non-empty stdout is the payload, whatever stderr says. Otherwise the
/// diagnostics are matched; unmatched diagnostics become
/// `GpgError::Unknown` carrying the raw bytes.
pub fn decryption(out: Captured, path: &Path) -> Result<Vec<u8>, GpgError> {
    if !out.stdout.is_empty() {
        if !out.stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&out.stderr), "ignoring diagnostics, payload present");
        }
        return Ok(out.stdout);
    }
    if let Some(failure) = first_match(&DECRYPT_RULES, &out.stderr) {
        debug!(?failure, path = %path.display(), "decryption failed");
        return Err(failure.into_error(path));
    }
    if out.stderr.is_empty() && out.success() {
        // an empty secret decrypts to nothing
        return Ok(Vec::new());
    }
    warn!(code = ?out.code, "unrecognized gpg diagnostics");
    Err(GpgError::Unknown { stderr: out.stderr })
}

/// Classify a packet listing. Only file-level problems are errors; a
/// listing without recipient packets is a valid, empty answer.
pub fn packet_listing(out: &Captured, path: &Path) -> Result<(), GpgError> {
    match first_match(&FILE_RULES, &out.stderr) {
        Some(failure) => {
            debug!(?failure, path = %path.display(), "packet listing failed");
            Err(failure.into_error(path))
        }
        None => Ok(()),
    }
}

/// Classify an encryption.
///
/// The failure phrases are looked for on stdout first. Any other
/// non-empty stdout is ciphertext; stderr is only consulted when there
/// is none.
pub fn encryption(out: Captured, subject: &Path) -> Result<Vec<u8>, GpgError> {
    if let Some(failure) = first_match(&ENCRYPT_RULES, &out.stdout) {
        debug!(?failure, "encryption failed");
        return Err(failure.into_error(subject));
    }
    if !out.stdout.is_empty() {
        return Ok(out.stdout);
    }
    if let Some(failure) = first_match(&ENCRYPT_RULES, &out.stderr) {
        debug!(?failure, "encryption failed");
        return Err(failure.into_error(subject));
    }
    warn!(code = ?out.code, "encryption produced no ciphertext");
    Err(GpgError::Unknown { stderr: out.stderr })
}
