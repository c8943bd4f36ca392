// src/errors.rs

//! Crate-wide error types.
//!
//! [`RemoteTailError`] covers failures that abort the run before any host is
//! contacted (bad config, unknown group). [`HostFailure`] is the per-host
//! failure a pipeline raises; it never aborts the run and is turned into a
//! diagnostic at the pipeline boundary.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteTailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown host group: {0}")]
    UnknownGroup(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Which stage of a host pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network connect, authentication, or the connect deadline.
    Connection,
    /// Pty allocation, command start, or a non-zero remote exit.
    Session,
    /// A non-clean read from the remote output, or an idle timeout.
    Stream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Connection => "connection",
            FailureKind::Session => "session",
            FailureKind::Stream => "stream",
        };
        f.write_str(s)
    }
}

/// A failure confined to one host.
///
/// `Display` renders the diagnostic form `[<host>] <cause>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{host}] {cause}")]
pub struct HostFailure {
    pub host: String,
    pub kind: FailureKind,
    pub cause: String,
}

impl HostFailure {
    pub fn new(host: impl Into<String>, kind: FailureKind, cause: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            kind,
            cause: cause.into(),
        }
    }

    pub fn connection(host: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(host, FailureKind::Connection, cause)
    }

    pub fn session(host: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(host, FailureKind::Session, cause)
    }

    pub fn stream(host: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(host, FailureKind::Stream, cause)
    }
}

pub type Result<T> = std::result::Result<T, RemoteTailError>;
