// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; defaults are not merged and
/// nothing is validated. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and resolve it into host targets.
///
/// - Reads TOML.
/// - Merges `[default]` into every `[server.<name>]`.
/// - Checks for:
///   - at least one server,
///   - user, credential and tail file on every server,
///   - group members that name unknown servers,
///   - parseable durations and a non-zero queue capacity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "remotetail.toml";
