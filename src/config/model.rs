// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::Credential;

pub const DEFAULT_QUEUE_CAPACITY: usize = 255;
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// queue_capacity = 255
/// connect_timeout = "10s"
///
/// [default]
/// user = "deploy"
/// private_key_path = "~/.ssh/id_ed25519"
/// tail_file = "/var/log/app.log"
///
/// [server.web1]
/// hostname = "10.0.0.11"
///
/// [server.web2]
/// hostname = "10.0.0.12"
/// tail_file = "/var/log/other.log"
///
/// [group]
/// web = ["web1", "web2"]
/// ```
///
/// All sections are optional at parse time; [`ConfigFile::try_from`] enforces
/// what a run actually needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Values applied to every server that does not override them.
    #[serde(default)]
    pub default: ServerSection,

    /// All servers from `[server.<name>]`, keyed by name.
    #[serde(default)]
    pub server: BTreeMap<String, ServerSection>,

    /// Named host groups from `[group]`, each a list of server names.
    #[serde(default)]
    pub group: BTreeMap<String, Vec<String>>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Capacity of the queue that merges all host streams.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Bound on connect + authenticate + command start per host, e.g. `"10s"`.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,

    /// Fail a host that produces no output for this long. Unset means a quiet
    /// log is never treated as a failure.
    #[serde(default)]
    pub idle_timeout: Option<String>,

    /// Plain output: no banner and no colours.
    #[serde(default)]
    pub silent: bool,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: None,
            silent: false,
        }
    }
}

/// Shape shared by `[default]` and each `[server.<name>]`.
///
/// Every field is optional here; a server's effective value is its own field,
/// else the `[default]` field, else a built-in default where one exists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Address to connect to. For a server this falls back to its name.
    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub private_key_path: Option<String>,

    #[serde(default)]
    pub private_key_passphrase: Option<String>,

    /// Remote file to tail.
    #[serde(default)]
    pub tail_file: Option<String>,

    /// `> 0` reads that many lines and exits; `0` follows the file.
    #[serde(default)]
    pub tail_lines: Option<u64>,

    /// Flags used instead of `-f` in follow mode, e.g. `"-F"`.
    #[serde(default)]
    pub follow_flags: Option<String>,
}

/// Validated run settings derived from `[config]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub queue_capacity: usize,
    pub connect_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub silent: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
            silent: false,
        }
    }
}

/// One remote endpoint plus its tailing parameters, with defaults applied.
///
/// Immutable once built; pipelines share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    /// Identity used to tag lines and diagnostics.
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
    pub tail_file: String,
    pub tail_lines: u64,
    pub follow_flags: Option<String>,
}

impl HostTarget {
    /// `user@hostname:file`, as listed in the banner and dry run.
    pub fn summary(&self) -> String {
        format!("{}@{}:{}", self.user, self.hostname, self.tail_file)
    }

    pub fn key_path(&self) -> Option<&PathBuf> {
        self.credential.private_key.as_ref().map(|k| &k.path)
    }
}

/// Fully validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: RunSettings,
    pub servers: BTreeMap<String, HostTarget>,
    pub groups: BTreeMap<String, Vec<String>>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: RunSettings,
        servers: BTreeMap<String, HostTarget>,
        groups: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            config,
            servers,
            groups,
        }
    }
}
