// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    ConfigFile, ConfigSection, DEFAULT_SSH_PORT, HostTarget, RawConfigFile, RunSettings,
    ServerSection,
};
use crate::errors::{RemoteTailError, Result};
use crate::types::{Credential, PrivateKey};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RemoteTailError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_servers(&raw)?;
        let settings = validate_global_config(&raw.config)?;

        let mut servers = BTreeMap::new();
        for (name, section) in raw.server.iter() {
            let target = resolve_server(name, section, &raw.default)?;
            servers.insert(name.clone(), target);
        }

        validate_groups(&raw)?;

        Ok(ConfigFile::new_unchecked(settings, servers, raw.group))
    }
}

fn ensure_has_servers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.is_empty() {
        return Err(RemoteTailError::ConfigError(
            "config must contain at least one [server.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &ConfigSection) -> Result<RunSettings> {
    if cfg.queue_capacity == 0 {
        return Err(RemoteTailError::ConfigError(
            "[config].queue_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    let connect_timeout = parse_duration(&cfg.connect_timeout).map_err(|e| {
        RemoteTailError::ConfigError(format!("[config].connect_timeout: {e}"))
    })?;
    if connect_timeout.is_zero() {
        return Err(RemoteTailError::ConfigError(
            "[config].connect_timeout must be greater than zero".to_string(),
        ));
    }

    let idle_timeout = match cfg.idle_timeout.as_deref() {
        Some(s) => {
            let d = parse_duration(s).map_err(|e| {
                RemoteTailError::ConfigError(format!("[config].idle_timeout: {e}"))
            })?;
            // "0s" reads naturally as "off".
            (!d.is_zero()).then_some(d)
        }
        None => None,
    };

    Ok(RunSettings {
        queue_capacity: cfg.queue_capacity,
        connect_timeout,
        idle_timeout,
        silent: cfg.silent,
    })
}

/// Merge one `[server.<name>]` with `[default]` into a `HostTarget`.
fn resolve_server(name: &str, server: &ServerSection, defaults: &ServerSection) -> Result<HostTarget> {
    let pick = |own: &Option<String>, fallback: &Option<String>| {
        own.clone()
            .or_else(|| fallback.clone())
            .filter(|s| !s.trim().is_empty())
    };

    let hostname = server
        .hostname
        .clone()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| name.to_string());

    let port = server.port.or(defaults.port).unwrap_or(DEFAULT_SSH_PORT);
    if port == 0 {
        return Err(RemoteTailError::ConfigError(format!(
            "server '{name}' has invalid port 0"
        )));
    }

    let user = pick(&server.user, &defaults.user).ok_or_else(|| {
        RemoteTailError::ConfigError(format!(
            "server '{name}' has no user (set `user` in [server.{name}] or [default])"
        ))
    })?;

    let tail_file = pick(&server.tail_file, &defaults.tail_file).ok_or_else(|| {
        RemoteTailError::ConfigError(format!(
            "server '{name}' has no tail_file (set it in [server.{name}] or [default])"
        ))
    })?;
    if tail_file.contains('\0') {
        return Err(RemoteTailError::ConfigError(format!(
            "server '{name}' has a tail_file containing a NUL byte"
        )));
    }

    let private_key = pick(&server.private_key_path, &defaults.private_key_path).map(|path| {
        PrivateKey {
            path: expand_home(&path),
            passphrase: pick(&server.private_key_passphrase, &defaults.private_key_passphrase),
        }
    });
    let credential = Credential {
        private_key,
        password: server.password.clone().or_else(|| defaults.password.clone()),
    };
    if credential.is_empty() {
        return Err(RemoteTailError::ConfigError(format!(
            "server '{name}' has no credential (set `password` or `private_key_path`)"
        )));
    }

    Ok(HostTarget {
        name: name.to_string(),
        hostname,
        port,
        user,
        credential,
        tail_file,
        tail_lines: server.tail_lines.or(defaults.tail_lines).unwrap_or(0),
        follow_flags: pick(&server.follow_flags, &defaults.follow_flags),
    })
}

fn validate_groups(cfg: &RawConfigFile) -> Result<()> {
    for (group, members) in cfg.group.iter() {
        for member in members.iter() {
            if !cfg.server.contains_key(member) {
                return Err(RemoteTailError::ConfigError(format!(
                    "group '{group}' refers to unknown server '{member}'"
                )));
            }
        }
    }
    Ok(())
}

/// Expand a leading `~/` against `$HOME`.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
