// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::{TargetOverrides, DEFAULT_CONFIG_FILE};

/// Command-line arguments for `remotetail`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "remotetail",
    version,
    about = "Tail a log file on many remote hosts at once, merged into one feed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `remotetail.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Tail only the servers of this `[group]` entry.
    #[arg(short, long, value_name = "NAME")]
    pub group: Option<String>,

    /// Read this many lines and exit instead of following (0 follows).
    ///
    /// Overrides `tail_lines` for every selected server.
    #[arg(short = 'n', long, value_name = "N")]
    pub lines: Option<u64>,

    /// Remote file to tail, overriding `tail_file` for every selected server.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// No banner and no colours.
    #[arg(short, long)]
    pub silent: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `REMOTETAIL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print targets and remote commands, but don't connect.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> TargetOverrides {
        TargetOverrides {
            tail_lines: self.lines,
            tail_file: self.file.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_every_server() {
        let args = CliArgs::try_parse_from(["remotetail"]).unwrap();
        assert_eq!(args.config, "remotetail.toml");
        assert!(args.group.is_none());
        assert!(!args.silent);
        assert!(!args.dry_run);
        let o = args.overrides();
        assert_eq!(o.tail_lines, None);
        assert_eq!(o.tail_file, None);
    }

    #[test]
    fn overrides_come_from_flags() {
        let args = CliArgs::try_parse_from([
            "remotetail",
            "-g",
            "web",
            "-n",
            "50",
            "--file",
            "/var/log/syslog",
            "--silent",
        ])
        .unwrap();
        assert_eq!(args.group.as_deref(), Some("web"));
        assert!(args.silent);
        let o = args.overrides();
        assert_eq!(o.tail_lines, Some(50));
        assert_eq!(o.tail_file.as_deref(), Some("/var/log/syslog"));
    }
}
