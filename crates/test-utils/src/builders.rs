#![allow(dead_code)]

use remotetail::config::{ConfigFile, HostTarget, RawConfigFile, ServerSection};
use remotetail::types::Credential;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts with a `[default]` section that makes any server valid on its own
/// (user, password, tail file).
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.default.user = Some("deploy".to_string());
        config.default.password = Some("pw".to_string());
        config.default.tail_file = Some("/var/log/app.log".to_string());
        Self { config }
    }

    /// Add a server whose hostname is its name.
    pub fn with_server(self, name: &str) -> Self {
        self.with_server_section(name, ServerSection::default())
    }

    pub fn with_server_section(mut self, name: &str, section: ServerSection) -> Self {
        self.config.server.insert(name.to_string(), section);
        self
    }

    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        self.config.group.insert(
            name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_default_tail_lines(mut self, lines: u64) -> Self {
        self.config.default.tail_lines = Some(lines);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.config.queue_capacity = capacity;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: &str) -> Self {
        self.config.config.connect_timeout = timeout.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `HostTarget`, bypassing config validation.
pub struct HostTargetBuilder {
    target: HostTarget,
}

impl HostTargetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            target: HostTarget {
                name: name.to_string(),
                hostname: name.to_string(),
                port: 22,
                user: "deploy".to_string(),
                credential: Credential::password("pw"),
                tail_file: "/var/log/app.log".to_string(),
                tail_lines: 0,
                follow_flags: None,
            },
        }
    }

    pub fn address(mut self, hostname: &str, port: u16) -> Self {
        self.target.hostname = hostname.to_string();
        self.target.port = port;
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.target.credential = credential;
        self
    }

    pub fn tail_lines(mut self, lines: u64) -> Self {
        self.target.tail_lines = lines;
        self
    }

    pub fn tail_file(mut self, file: &str) -> Self {
        self.target.tail_file = file.to_string();
        self
    }

    pub fn follow_flags(mut self, flags: &str) -> Self {
        self.target.follow_flags = Some(flags.to_string());
        self
    }

    pub fn build(self) -> HostTarget {
        self.target
    }
}

/// Plain targets named after `names`, following `/var/log/app.log`.
pub fn targets(names: &[&str]) -> Vec<std::sync::Arc<HostTarget>> {
    names
        .iter()
        .map(|n| std::sync::Arc::new(HostTargetBuilder::new(n).build()))
        .collect()
}
