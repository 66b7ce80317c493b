//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::config::Config;
use crate::core::constants;
use crate::core::gpg::{GnuPg, GpgOptions, Resolver, SystemRunner};
use crate::core::store::PasswordStore;
use crate::error::Result;

/// Cellar - a tree-structured password store on top of GnuPG.
#[derive(Parser)]
#[command(
    name = "cellar",
    about = "A tree-structured password store on top of GnuPG",
    version
)]
pub struct Cli {
    /// Enable debug logging (overridden by CELLAR_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.config/cellar/config.toml
    #[arg(long, global = true, env = "CELLAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store root, overriding the config file
    #[arg(long, global = true, env = "CELLAR_STORE_DIR")]
    pub store: Option<PathBuf>,

    /// Alternate GnuPG home directory
    #[arg(long, global = true, env = "CELLAR_GPG_HOME")]
    pub gpg_home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a store whose root is encrypted to KEY_ID
    Init {
        /// Key identifier (defaults to gpg.user_key_id from the config)
        key_id: Option<String>,
    },

    /// Decrypt and print a secret
    Show {
        /// Secret name, e.g. team/db
        name: String,
    },

    /// Encrypt stdin as a secret
    Insert {
        /// Secret name, e.g. team/db
        name: String,
        /// Overwrite if the secret exists
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a secret
    Rm {
        /// Secret name
        name: String,
    },

    /// Move a secret, or a directory with --dir
    Mv {
        /// Current name
        from: String,
        /// New name
        to: String,
        /// Move a directory instead of a single secret
        #[arg(short, long)]
        dir: bool,
    },

    /// Create an empty directory
    Mkdir {
        /// Directory relative to the store root
        dir: String,
    },

    /// Show available keys and the keys a directory is encrypted to
    Recipients {
        /// Directory relative to the store root
        #[arg(default_value = ".")]
        dir: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a directory's recipients and re-encrypt its secrets
    SetRecipients {
        /// Directory relative to the store root
        dir: String,
        /// Key identifiers
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Re-encrypt a directory to the recipients that govern it
    Reencrypt {
        /// Directory relative to the store root
        #[arg(default_value = ".")]
        dir: String,
    },

    /// List the key ids a secret is encrypted to
    Packets {
        /// Secret name
        name: String,
    },

    /// List user ids in the keyring
    Keys {
        /// List secret keys instead of public keys
        #[arg(long)]
        secret: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import the public keys shipped in the store's .available-keys
    Import,

    /// Show the resolved gpg binary
    Version,
}

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    /// Where `config` was read from, and where it is saved.
    pub config_path: PathBuf,
    pub store_root: PathBuf,
    pub gpg_home: Option<PathBuf>,
}

impl Context {
    /// Merge the config file with command-line and environment overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Config::resolve_path(cli.config.as_deref())?;
        let config = Config::load(Some(&config_path))?;
        let store_root = match &cli.store {
            Some(root) => root.clone(),
            None => config.store_root()?,
        };
        let gpg_home = cli.gpg_home.clone().or_else(|| config.gpg.home.clone());
        debug!(store = %store_root.display(), ?gpg_home, "context");
        Ok(Self {
            config,
            config_path,
            store_root,
            gpg_home,
        })
    }

    /// Resolve the gpg binary and build the backend.
    pub fn backend(&self) -> Result<GnuPg> {
        let resolver = Resolver::with_candidates(
            SystemRunner,
            self.config.primary_binary(),
            constants::SECONDARY_BINARY,
        );
        let binary = resolver.resolve()?.clone();
        Ok(GnuPg::new(binary).home(self.gpg_home.clone()))
    }

    /// Open the configured store with a live backend.
    pub fn store(&self) -> Result<PasswordStore<GnuPg>> {
        let backend = self.backend()?;
        Ok(PasswordStore::open(&self.store_root, backend)?.with_options(GpgOptions {
            home: self.gpg_home.clone(),
            extra_args: Vec::new(),
        }))
    }
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let ctx = Context::load(&cli)?;
    match cli.command {
        Init { key_id } => commands::init(&ctx, key_id),
        Show { name } => commands::show(&ctx, &name),
        Insert { name, force } => commands::insert(&ctx, &name, force),
        Rm { name } => commands::remove(&ctx, &name),
        Mv { from, to, dir } => commands::move_entry(&ctx, &from, &to, dir),
        Mkdir { dir } => commands::mkdir(&ctx, &dir),
        Recipients { dir, json } => commands::recipients(&ctx, &dir, json),
        SetRecipients { dir, keys } => commands::set_recipients(&ctx, &dir, &keys),
        Reencrypt { dir } => commands::reencrypt(&ctx, &dir),
        Packets { name } => commands::packets(&ctx, &name),
        Keys { secret, json } => commands::keys(&ctx, secret, json),
        Import => commands::import(&ctx),
        Version => commands::version(&ctx),
    }
}
