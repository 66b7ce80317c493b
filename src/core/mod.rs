//! Core library components.
//!
//! The store layout, the gpg adapter and the re-encryption walk. Nothing
//! here prints; the CLI decides how results are shown.

pub mod config;
pub mod constants;
pub mod gpg;
pub mod keys;
pub mod recipients;
pub mod reencrypt;
pub mod relocate;
pub mod store;
pub mod tree;
