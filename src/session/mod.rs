// src/session/mod.rs

//! Remote execution sessions.
//!
//! - [`transport`] defines the `Transport` / `RemoteSession` / `OutputStream`
//!   seam the pipelines are written against.
//! - [`ssh`] is the production implementation over `russh`.

pub mod ssh;
pub mod transport;

pub use ssh::SshTransport;
pub use transport::{BoxFuture, OutputStream, RemoteSession, Transport};
