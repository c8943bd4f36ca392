// src/pipeline/launcher.rs

//! Session launcher: connect to a host and start the remote `tail`.

use tracing::debug;

use crate::config::HostTarget;
use crate::errors::HostFailure;
use crate::session::{OutputStream, RemoteSession, Transport};

/// Remote command for `target`.
///
/// - `tail_lines > 0`: `tail -n <count> <file>` (reads and exits)
/// - otherwise: `tail -f <file>`, or `tail <follow_flags> <file>` when flags
///   such as `-F` are configured.
///
/// The file path is shell-quoted; follow flags are passed through verbatim.
pub fn tail_command(target: &HostTarget) -> Result<String, HostFailure> {
    let file = shlex::try_quote(&target.tail_file).map_err(|e| {
        HostFailure::session(
            &target.name,
            format!("cannot quote tail file {:?}: {e}", target.tail_file),
        )
    })?;

    let command = if target.tail_lines > 0 {
        format!("tail -n {} {file}", target.tail_lines)
    } else {
        match target.follow_flags.as_deref().map(str::trim) {
            Some(flags) if !flags.is_empty() => format!("tail {flags} {file}"),
            _ => format!("tail -f {file}"),
        }
    };
    Ok(command)
}

/// Connect and authenticate. The returned session belongs to the caller, who
/// must `close` it.
pub async fn open_session(
    transport: &dyn Transport,
    target: &HostTarget,
) -> Result<Box<dyn RemoteSession>, HostFailure> {
    debug!(host = %target.name, address = %target.hostname, port = target.port, "connecting");
    transport.connect(target).await
}

/// Start `command` on an open session.
pub async fn start_tail(
    host: &str,
    session: &mut dyn RemoteSession,
    command: &str,
) -> Result<Box<dyn OutputStream>, HostFailure> {
    debug!(host, command, "starting remote tail");
    session.start_streaming_command(command).await
}
