// src/config/targets.rs

//! Selecting the hosts a run should tail.

use std::sync::Arc;

use crate::config::model::{ConfigFile, HostTarget};
use crate::errors::{RemoteTailError, Result};

/// Command-line values that win over anything in the config file.
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub tail_lines: Option<u64>,
    pub tail_file: Option<String>,
}

/// Pick the targets for this run.
///
/// - With a group: that group's servers, in the order listed. An empty group
///   yields no targets.
/// - Without a group: every configured server, in name order.
///
/// Overrides are applied to each selected target.
pub fn select_targets(
    cfg: &ConfigFile,
    group: Option<&str>,
    overrides: &TargetOverrides,
) -> Result<Vec<Arc<HostTarget>>> {
    let selected: Vec<&HostTarget> = match group {
        Some(name) => {
            let members = cfg
                .groups
                .get(name)
                .ok_or_else(|| RemoteTailError::UnknownGroup(name.to_string()))?;
            members
                .iter()
                .map(|m| {
                    cfg.servers.get(m).ok_or_else(|| {
                        RemoteTailError::ConfigError(format!(
                            "group '{name}' refers to unknown server '{m}'"
                        ))
                    })
                })
                .collect::<Result<_>>()?
        }
        None => cfg.servers.values().collect(),
    };

    let mut targets = Vec::with_capacity(selected.len());
    for target in selected {
        // Listing a server twice in a group must not open two sessions.
        if targets.iter().any(|t: &Arc<HostTarget>| t.name == target.name) {
            continue;
        }

        let mut target = target.clone();
        if let Some(lines) = overrides.tail_lines {
            target.tail_lines = lines;
        }
        if let Some(ref file) = overrides.tail_file {
            target.tail_file = file.clone();
        }
        targets.push(Arc::new(target));
    }

    Ok(targets)
}
