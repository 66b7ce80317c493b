//! Error types.
//!
//! Every concern gets its own enum; `Error` folds them together so `?`
//! works across module boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the OpenPGP backend or rejected before invoking it.
#[derive(Error, Debug)]
pub enum GpgError {
    /// No candidate binary reported a supported major version.
    #[error("no usable gpg binary: {0}")]
    BinaryUnavailable(String),

    /// The binary could not be spawned or its streams could not be drained.
    #[error("failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("not a file: {0}")]
    NotAFile(PathBuf),

    #[error("no valid OpenPGP data found in {0}")]
    InvalidCiphertext(PathBuf),

    #[error("decryption failed: no secret key")]
    NoSecretKey,

    #[error("encryption failed: no public key")]
    NoPublicKey,

    #[error("no recipients given")]
    NoRecipients,

    #[error("decrypted content is not valid UTF-8: {0}")]
    TextDecode(#[from] std::string::FromUtf8Error),

    /// Diagnostic output that matched no known phrase.
    #[error("unknown gpg error: {}", String::from_utf8_lossy(.stderr).trim())]
    Unknown { stderr: Vec<u8> },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no key id given and gpg.user_key_id is not configured")]
    NoUserKey,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("password store not initialized at {0}")]
    NotInitialized(PathBuf),

    #[error("password store already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("no .gpg-id file governs {0}")]
    NoRecipientFile(PathBuf),

    #[error("{path} is outside the password store {root}")]
    OutsideStore { path: PathBuf, root: PathBuf },

    #[error("secret not found: {0}")]
    SecretNotFound(String),

    #[error("secret already exists: {0} (use --force to overwrite)")]
    SecretExists(String),

    #[error("directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("cannot move {from} into itself ({to})")]
    MoveIntoSelf { from: PathBuf, to: PathBuf },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gpg(#[from] GpgError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The backend error kind, if this is one.
    pub fn gpg(&self) -> Option<&GpgError> {
        match self {
            Self::Gpg(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
