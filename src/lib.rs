//! Cellar - a tree-structured password store driven by an external
//! OpenPGP binary.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # One function per subcommand
//! │   └── output        # Terminal formatting
//! └── core/             # Core library components
//!     ├── config        # config.toml management
//!     ├── constants     # File names and binary candidates
//!     ├── gpg/          # OpenPGP backend
//!     │   ├── binary    # Version-checked binary resolution
//!     │   ├── process   # Spawning and output capture
//!     │   ├── classify  # Diagnostic phrase -> error kind
//!     │   ├── listing   # Key id and user id extraction
//!     │   └── gnupg     # CryptoBackend over the gpg CLI
//!     ├── recipients    # .gpg-id files
//!     ├── tree          # Directory listing seam
//!     ├── reencrypt     # Recipient rotation over a subtree
//!     ├── keys          # .available-keys import
//!     └── store         # PasswordStore facade
//! ```
//!
//! # Store layout
//!
//! Secrets are `.gpg` files in a directory tree. A directory's `.gpg-id`
//! lists the keys its secrets are encrypted to; directories without one
//! inherit the nearest ancestor's. A directory with its own `.gpg-id` is a
//! trust boundary that rotations of its ancestors never cross.

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::gpg::{CryptoBackend, GpgOptions};
pub use crate::core::store::PasswordStore;
pub use crate::error::{Error, GpgError, Result};
