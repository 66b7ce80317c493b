//! Command implementations.

use std::io::{Read, Write};

use tracing::info;
use zeroize::Zeroizing;

use crate::cli::{output, Context};
use crate::core::gpg::CryptoBackend;
use crate::core::reencrypt::Reencryption;
use crate::core::store;
use crate::error::{ConfigError, Result};

/// Create the store root and its recipient file.
///
/// Does not touch gpg, so it works before a binary is installed.
pub fn init(ctx: &Context, key_id: Option<String>) -> Result<()> {
    let key_id = key_id
        .or_else(|| ctx.config.gpg.user_key_id.clone())
        .ok_or(ConfigError::NoUserKey)?;
    let gpg_id = store::init(&ctx.store_root, &key_id)?;
    output::success(&format!(
        "initialized {} for {}",
        output::path(ctx.store_root.display()),
        key_id
    ));
    info!(file = %gpg_id.display(), "wrote recipient file");

    if ctx.config.gpg.user_key_id.is_none() {
        let mut config = ctx.config.clone();
        config.gpg.user_key_id = Some(key_id);
        match config.save(&ctx.config_path) {
            Ok(()) => info!(path = %ctx.config_path.display(), "saved key id to config"),
            Err(e) => output::warn(&format!("could not save key id to config: {}", e)),
        }
    }
    Ok(())
}

pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let store = ctx.store()?;
    let secret = store.show(name)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(secret.as_bytes())?;
    if !secret.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// Encrypt whatever arrives on stdin.
pub fn insert(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let store = ctx.store()?;
    let mut cleartext = Zeroizing::new(Vec::new());
    std::io::stdin().read_to_end(&mut cleartext)?;
    let path = store.insert(name, &cleartext, force)?;
    output::success(&format!("stored {}", output::path(path.display())));
    Ok(())
}

pub fn remove(ctx: &Context, name: &str) -> Result<()> {
    let store = ctx.store()?;
    let path = store.remove(name)?;
    output::success(&format!("removed {}", output::path(path.display())));
    Ok(())
}

/// Move a secret, or a whole directory when `dir` is set.
pub fn move_entry(ctx: &Context, from: &str, to: &str, dir: bool) -> Result<()> {
    let store = ctx.store()?;
    let summary = if dir {
        store.move_dir(from, to)?
    } else {
        store.move_secret(from, to)?
    };
    output::success(&format!("moved {} to {}", from, to));
    if !summary.reencrypted.is_empty() {
        report(&summary);
    }
    Ok(())
}

pub fn mkdir(ctx: &Context, dir: &str) -> Result<()> {
    let store = ctx.store()?;
    let path = store.create_dir(dir)?;
    output::success(&format!("created {}", output::path(path.display())));
    Ok(())
}

pub fn recipients(ctx: &Context, dir: &str, json: bool) -> Result<()> {
    let store = ctx.store()?;
    let dir = store.dir(dir)?;
    let view = store.recipient_view(&dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    output::header("Authorized");
    for key in &view.authorized {
        output::list_item(key);
    }
    output::header("Available");
    if view.available.is_empty() {
        println!("  {}", output::dimmed("no public keys in keyring"));
    }
    for uid in &view.available {
        output::list_item(uid);
    }
    Ok(())
}

pub fn set_recipients(ctx: &Context, dir: &str, keys: &[String]) -> Result<()> {
    let store = ctx.store()?;
    let dir = store.dir(dir)?;
    let summary = store.set_recipients(&dir, keys)?;
    report(&summary);
    Ok(())
}

pub fn reencrypt(ctx: &Context, dir: &str) -> Result<()> {
    let store = ctx.store()?;
    let dir = store.dir(dir)?;
    let summary = store.reencrypt(&dir)?;
    report(&summary);
    Ok(())
}

fn report(summary: &Reencryption) {
    output::success(&format!("re-encrypted {} secret(s)", summary.reencrypted.len()));
    for boundary in &summary.boundaries {
        println!(
            "  {} {}",
            output::dimmed("skipped"),
            output::path(boundary.display())
        );
    }
}

pub fn packets(ctx: &Context, name: &str) -> Result<()> {
    let store = ctx.store()?;
    let key_ids = store.packets(name)?;
    if key_ids.is_empty() {
        output::warn("no recipient packets found");
    }
    for key_id in key_ids {
        println!("{}", key_id);
    }
    Ok(())
}

pub fn keys(ctx: &Context, secret: bool, json: bool) -> Result<()> {
    let backend = ctx.backend()?;
    let uids = backend.list_keys(secret)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&uids)?);
        return Ok(());
    }
    for uid in &uids {
        output::list_item(uid);
    }
    Ok(())
}

pub fn import(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let imported = store.refresh()?;
    if imported.is_empty() {
        output::warn("no keys to import in .available-keys");
    } else {
        output::success(&format!("imported {} key file(s)", imported.len()));
    }
    Ok(())
}

pub fn version(ctx: &Context) -> Result<()> {
    let backend = ctx.backend()?;
    let binary = backend.binary();
    output::header("gpg");
    output::kv("binary:", binary.path().display());
    output::kv("major: ", binary.major());
    Ok(())
}
