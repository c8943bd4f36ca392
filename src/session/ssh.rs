// src/session/ssh.rs

//! SSH transport backed by `russh`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect, Pty};
use russh_keys::key;
use tracing::{debug, warn};

use crate::config::HostTarget;
use crate::errors::HostFailure;

use super::transport::{BoxFuture, OutputStream, RemoteSession, Transport};

/// Pty geometry for non-interactive streaming output.
const PTY_TERM: &str = "xterm";
const PTY_COLUMNS: u32 = 80;
const PTY_ROWS: u32 = 40;

const TERMINAL_MODES: &[(Pty, u32)] = &[
    (Pty::ECHO, 0),
    (Pty::TTY_OP_ISPEED, 14400),
    (Pty::TTY_OP_OSPEED, 14400),
];

/// Production transport: one SSH connection per host.
pub struct SshTransport {
    config: Arc<client::Config>,
}

impl SshTransport {
    pub fn new() -> Self {
        let config = client::Config {
            // Detect hosts that vanish mid-stream instead of waiting forever.
            keepalive_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SshTransport {
    fn connect<'a>(
        &'a self,
        target: &'a HostTarget,
    ) -> BoxFuture<'a, Result<Box<dyn RemoteSession>, HostFailure>> {
        Box::pin(async move {
            debug!(
                host = %target.name,
                address = %target.hostname,
                port = target.port,
                "opening ssh connection"
            );

            let handler = ClientHandler {
                host: target.name.clone(),
            };
            let mut handle = client::connect(
                Arc::clone(&self.config),
                (target.hostname.as_str(), target.port),
                handler,
            )
            .await
            .map_err(|e| HostFailure::connection(&target.name, format!("unable to connect: {e}")))?;

            if let Err(failure) = authenticate(&mut handle, target).await {
                disconnect(&target.name, &handle).await;
                return Err(failure);
            }

            debug!(host = %target.name, user = %target.user, "ssh session authenticated");

            Ok::<_, HostFailure>(Box::new(SshSession {
                host: target.name.clone(),
                handle,
            }) as Box<dyn RemoteSession>)
        })
    }
}

/// Host keys are accepted without verification; the fingerprint is logged so
/// an operator can audit what was trusted.
struct ClientHandler {
    host: String,
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(
            host = %self.host,
            fingerprint = %server_public_key.fingerprint(),
            "accepting server host key"
        );
        Ok(true)
    }
}

/// Key first, then password.
async fn authenticate(
    handle: &mut Handle<ClientHandler>,
    target: &HostTarget,
) -> Result<(), HostFailure> {
    let host = target.name.as_str();

    if let Some(ref key) = target.credential.private_key {
        match russh_keys::load_secret_key(&key.path, key.passphrase.as_deref()) {
            Ok(pair) => {
                let accepted = handle
                    .authenticate_publickey(target.user.clone(), Arc::new(pair))
                    .await
                    .map_err(|e| {
                        HostFailure::connection(host, format!("public key authentication failed: {e}"))
                    })?;
                if accepted {
                    return Ok(());
                }
                debug!(host, key = %key.path.display(), "public key rejected by server");
            }
            Err(e) if target.credential.password.is_some() => {
                warn!(
                    host,
                    key = %key.path.display(),
                    error = %e,
                    "unable to load private key; falling back to password"
                );
            }
            Err(e) => {
                return Err(HostFailure::connection(
                    host,
                    format!("unable to load private key {}: {e}", key.path.display()),
                ));
            }
        }
    }

    if let Some(ref password) = target.credential.password {
        let accepted = handle
            .authenticate_password(target.user.clone(), password.clone())
            .await
            .map_err(|e| {
                HostFailure::connection(host, format!("password authentication failed: {e}"))
            })?;
        if accepted {
            return Ok(());
        }
    }

    Err(HostFailure::connection(
        host,
        format!("authentication rejected for user '{}'", target.user),
    ))
}

async fn disconnect(host: &str, handle: &Handle<ClientHandler>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        debug!(host, error = %e, "error while disconnecting");
    }
}

struct SshSession {
    host: String,
    handle: Handle<ClientHandler>,
}

impl RemoteSession for SshSession {
    fn start_streaming_command<'a>(
        &'a mut self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn OutputStream>, HostFailure>> {
        Box::pin(async move {
            let host = self.host.as_str();

            let mut channel = self.handle.channel_open_session().await.map_err(|e| {
                HostFailure::session(host, format!("unable to create session: {e}"))
            })?;
            let mut pending = VecDeque::new();

            channel
                .request_pty(true, PTY_TERM, PTY_COLUMNS, PTY_ROWS, 0, 0, TERMINAL_MODES)
                .await
                .map_err(|e| HostFailure::session(host, format!("unable to create pty: {e}")))?;
            await_reply(host, &mut channel, &mut pending, "pty request").await?;

            debug!(host, command, "starting remote command");
            channel.exec(true, command).await.map_err(|e| {
                HostFailure::session(host, format!("failed to execute command: {e}"))
            })?;
            await_reply(host, &mut channel, &mut pending, "command").await?;

            Ok::<_, HostFailure>(Box::new(SshOutput {
                host: self.host.clone(),
                channel,
                pending,
                exit_status: None,
            }) as Box<dyn OutputStream>)
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            disconnect(&self.host, &self.handle).await;
        })
    }
}

/// Wait for the server's answer to a `want_reply` request.
///
/// Anything else that arrives first is kept for the output stream.
async fn await_reply(
    host: &str,
    channel: &mut Channel<Msg>,
    pending: &mut VecDeque<ChannelMsg>,
    what: &str,
) -> Result<(), HostFailure> {
    loop {
        match channel.wait().await {
            Some(ChannelMsg::Success) => return Ok(()),
            Some(ChannelMsg::Failure) => {
                return Err(HostFailure::session(
                    host,
                    format!("{what} rejected by server"),
                ));
            }
            Some(ChannelMsg::Close) | None => {
                return Err(HostFailure::session(
                    host,
                    format!("channel closed before {what} was acknowledged"),
                ));
            }
            Some(other) => pending.push_back(other),
        }
    }
}

struct SshOutput {
    host: String,
    channel: Channel<Msg>,
    pending: VecDeque<ChannelMsg>,
    exit_status: Option<u32>,
}

/// Outcome of a channel that closed after the command started.
///
/// Only an explicit zero exit status is a clean end; a channel that closes
/// without reporting how the command ended is a stream failure.
fn exit_outcome(host: &str, exit_status: Option<u32>) -> Result<Option<Vec<u8>>, HostFailure> {
    match exit_status {
        Some(0) => Ok(None),
        Some(code) => Err(HostFailure::session(
            host,
            format!("failed to wait command: remote exited with status {code}"),
        )),
        None => Err(HostFailure::stream(
            host,
            "remote command exited without exit status or exit signal",
        )),
    }
}

impl OutputStream for SshOutput {
    fn next_chunk(&mut self) -> BoxFuture<'_, Result<Option<Vec<u8>>, HostFailure>> {
        Box::pin(async move {
            loop {
                let msg = match self.pending.pop_front() {
                    Some(msg) => Some(msg),
                    None => self.channel.wait().await,
                };

                match msg {
                    Some(ChannelMsg::Data { data }) => return Ok(Some(data.to_vec())),
                    // A pty merges stderr already; keep anything that still arrives.
                    Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(Some(data.to_vec())),
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        self.exit_status = Some(exit_status);
                    }
                    Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                        return Err(HostFailure::stream(
                            &self.host,
                            format!("remote command terminated by signal {signal_name:?}"),
                        ));
                    }
                    Some(ChannelMsg::Close) | None => {
                        return exit_outcome(&self.host, self.exit_status);
                    }
                    Some(_) => {}
                }
            }
        })
    }
}
