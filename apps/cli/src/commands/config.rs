//! # Config Commands
//!
//! `shop config show` prints the effective configuration and
//! `shop config init` writes a starter `config.toml`.

use std::io::Write;
use std::path::PathBuf;

use storefront_client::{ClientConfig, ClientError};
use tracing::debug;

use crate::error::CliError;
use crate::ConfigAction;

/// Runs a config subcommand. `path` is the `--config` flag, if given.
pub fn run(action: ConfigAction, path: Option<PathBuf>, out: &mut dyn Write) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => show(path, out),
        ConfigAction::Init { api_url, force } => init(path, api_url, force, out),
    }
}

/// Prints the configuration `shop` would run with.
pub fn show(path: Option<PathBuf>, out: &mut dyn Write) -> Result<(), CliError> {
    debug!("config show command");
    let config = ClientConfig::load(path)?;

    writeln!(out, "api.base_url       = {}", config.api.base_url)?;
    writeln!(out, "api.timeout_secs   = {}", config.api.timeout_secs)?;
    match config.data_dir() {
        Some(dir) => writeln!(out, "storage.data_dir   = {}", dir.display())?,
        None => writeln!(out, "storage.data_dir   = (unavailable)")?,
    }
    writeln!(out, "storage.token_key  = {}", config.storage.token_key)?;
    writeln!(out, "storage.cart_key   = {}", config.storage.cart_key)?;
    Ok(())
}

/// Writes a config file with default settings and an optional API URL.
///
/// An existing file is only replaced with `force`.
pub fn init(path: Option<PathBuf>, api_url: Option<String>, force: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let path = path
        .or_else(ClientConfig::default_config_path)
        .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

    if path.exists() && !force {
        return Err(CliError::ConfigExists(path));
    }

    let mut config = ClientConfig::default();
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    config.validate()?;
    config.save(Some(path.clone()))?;

    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}
