// src/session/transport.rs

//! Pluggable remote-execution transport.
//!
//! Pipelines talk to a `Transport` instead of an SSH client directly. This
//! keeps the concurrency and failure handling testable with a scripted fake
//! while production uses [`SshTransport`](super::ssh::SshTransport).

use std::future::Future;
use std::pin::Pin;

use crate::config::HostTarget;
use crate::errors::HostFailure;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opens authenticated sessions to hosts.
pub trait Transport: Send + Sync {
    /// Connect and authenticate against `target`.
    ///
    /// Failures are [`FailureKind::Connection`](crate::errors::FailureKind).
    fn connect<'a>(
        &'a self,
        target: &'a HostTarget,
    ) -> BoxFuture<'a, Result<Box<dyn RemoteSession>, HostFailure>>;
}

/// A live, authenticated session bound to one host.
///
/// Owned by exactly one pipeline. `close` must be called on every exit path
/// once the session exists; dropping the output stream first releases the
/// remote process, `close` then releases the connection.
pub trait RemoteSession: Send {
    /// Allocate a pty and start `command`, returning its merged output.
    fn start_streaming_command<'a>(
        &'a mut self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn OutputStream>, HostFailure>>;

    fn close(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// Raw output bytes of a remote command.
pub trait OutputStream: Send {
    /// Next chunk of output. `Ok(None)` is a clean end of stream; an `Err` is
    /// a read failure or an unsuccessful remote exit.
    fn next_chunk(&mut self) -> BoxFuture<'_, Result<Option<Vec<u8>>, HostFailure>>;
}
