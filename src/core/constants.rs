//! Constants used throughout cellar.
//!
//! Centralizes magic strings shared by the store layout and the gpg adapter.

/// Per-directory recipient list (one key identifier per line).
pub const RECIPIENT_FILE: &str = ".gpg-id";

/// Extension of encrypted secrets.
pub const CIPHER_EXTENSION: &str = ".gpg";

/// Bootstrap directory at the store root holding key material to import.
pub const KEY_DIR: &str = ".available-keys";

/// Default store location relative to HOME.
pub const DEFAULT_STORE_DIR: &str = ".password-store";

/// Binary queried first during resolution.
pub const PRIMARY_BINARY: &str = "gpg";

/// Binary tried when the primary reports major version 1.
pub const SECONDARY_BINARY: &str = "gpg2";

/// The only major version whose semantics the adapter understands.
pub const REQUIRED_MAJOR: u8 = 2;

/// Config file name inside the per-user config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "cellar";
