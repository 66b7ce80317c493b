//! Cellar - a tree-structured password store on top of GnuPG.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cellar::cli::output;
use cellar::cli::{execute, Cli};
use cellar::error::{ConfigError, Error, GpgError, StoreError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("CELLAR_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cellar=debug")
        } else {
            EnvFilter::new("cellar=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Gpg(GpgError::BinaryUnavailable(_)) => {
                Some("install GnuPG 2.x from https://gnupg.org/download/")
            }
            Error::Gpg(GpgError::NoSecretKey) => Some("none of your secret keys can open this"),
            Error::Gpg(GpgError::NoPublicKey) => Some("import the missing key, or run: cellar import"),
            Error::Store(StoreError::NotInitialized(_)) => Some("run: cellar init <key-id>"),
            Error::Store(StoreError::NoRecipientFile(_)) => Some("run: cellar init <key-id>"),
            Error::Config(ConfigError::NoUserKey) => {
                Some("pass a key id or set gpg.user_key_id in config.toml")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
