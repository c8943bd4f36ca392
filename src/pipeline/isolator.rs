// src/pipeline/isolator.rs

//! Failure isolator: one host's whole pipeline, with every failure contained.
//!
//! `run_pipeline` never returns an error. Whatever happens to the host is
//! folded into a [`PipelineReport`]; failures also go to the diagnostic sink.
//! The session, once opened, is closed on every path out.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::HostTarget;
use crate::engine::{PipelineState, QueueSender, Shutdown};
use crate::errors::HostFailure;
use crate::session::RemoteSession;
use crate::types::HostName;

use super::extractor::forward_lines;
use super::launcher::{open_session, start_tail, tail_command};
use super::{PipelineContext, PipelineReport};

/// How the pipeline body ended when it did not fail.
enum Ending {
    Completed,
    Cancelled,
}

/// Logs every state transition and remembers the current state.
struct StateTracker {
    host: HostName,
    state: PipelineState,
}

impl StateTracker {
    fn new(host: HostName) -> Self {
        debug!(host = %host, state = %PipelineState::Connecting, "pipeline started");
        Self {
            host,
            state: PipelineState::Connecting,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        if !self.state.can_advance_to(next) {
            warn!(host = %self.host, from = %self.state, to = %next, "ignoring illegal pipeline transition");
            return;
        }
        debug!(host = %self.host, from = %self.state, to = %next, "pipeline state change");
        self.state = next;
    }
}

/// Run the pipeline for `target` to a terminal state.
pub async fn run_pipeline(
    ctx: PipelineContext,
    target: Arc<HostTarget>,
    queue: QueueSender,
) -> PipelineReport {
    let host: HostName = Arc::from(target.name.as_str());
    let mut tracker = StateTracker::new(host.clone());
    let mut shutdown = ctx.shutdown.clone();
    let mut forwarded = 0u64;

    let result = drive(&ctx, &target, &queue, &mut shutdown, &mut tracker, &mut forwarded).await;
    // Release our producer handle before reporting so the queue can close as
    // soon as the last pipeline is done.
    drop(queue);

    match result {
        Ok(ending) => {
            tracker.enter(PipelineState::Closed);
            let cancelled = matches!(ending, Ending::Cancelled);
            info!(host = %host, lines = forwarded, cancelled, "pipeline closed");
            PipelineReport {
                host,
                state: PipelineState::Closed,
                lines_forwarded: forwarded,
                cancelled,
                failure: None,
            }
        }
        Err(failure) => {
            tracker.enter(PipelineState::Failed);
            warn!(
                host = %host,
                kind = %failure.kind,
                cause = %failure.cause,
                lines = forwarded,
                "pipeline failed"
            );
            ctx.diagnostics.report(&failure);
            PipelineReport {
                host,
                state: PipelineState::Failed,
                lines_forwarded: forwarded,
                cancelled: false,
                failure: Some(failure),
            }
        }
    }
}

async fn drive(
    ctx: &PipelineContext,
    target: &HostTarget,
    queue: &QueueSender,
    shutdown: &mut Shutdown,
    tracker: &mut StateTracker,
    forwarded: &mut u64,
) -> Result<Ending, HostFailure> {
    let command = tail_command(target)?;
    let limit = ctx.settings.connect_timeout;
    // One deadline covers connect, authentication, pty and command start.
    let deadline = Instant::now() + limit;

    let connect = timeout_at(deadline, open_session(ctx.transport.as_ref(), target));
    let mut session = match until_shutdown(shutdown, connect).await {
        None => return Ok(Ending::Cancelled),
        Some(Err(_elapsed)) => {
            return Err(HostFailure::connection(
                &target.name,
                format!("unable to connect: timed out after {limit:?}"),
            ));
        }
        Some(Ok(opened)) => opened?,
    };
    tracker.enter(PipelineState::Authenticated);

    let result = stream(
        ctx,
        target,
        &mut *session,
        &command,
        deadline,
        queue,
        shutdown,
        tracker,
        forwarded,
    )
    .await;

    session.close().await;
    debug!(host = %target.name, "session released");
    result
}

#[allow(clippy::too_many_arguments)]
async fn stream(
    ctx: &PipelineContext,
    target: &HostTarget,
    session: &mut dyn RemoteSession,
    command: &str,
    deadline: Instant,
    queue: &QueueSender,
    shutdown: &mut Shutdown,
    tracker: &mut StateTracker,
    forwarded: &mut u64,
) -> Result<Ending, HostFailure> {
    let start = timeout_at(deadline, start_tail(&target.name, session, command));
    let mut output = match until_shutdown(shutdown, start).await {
        None => return Ok(Ending::Cancelled),
        Some(Err(_elapsed)) => {
            return Err(HostFailure::session(
                &target.name,
                format!(
                    "failed to execute command: timed out after {:?}",
                    ctx.settings.connect_timeout
                ),
            ));
        }
        Some(Ok(started)) => started?,
    };
    tracker.enter(PipelineState::Streaming);

    let host = tracker.host.clone();
    let lines = forward_lines(
        &host,
        &mut *output,
        queue,
        ctx.settings.idle_timeout,
        forwarded,
    );
    let result = until_shutdown(shutdown, lines).await;
    // The remote process goes before the connection.
    drop(output);

    match result {
        None => Ok(Ending::Cancelled),
        Some(res) => res.map(|()| Ending::Completed),
    }
}

/// Run `fut` unless shutdown fires first.
async fn until_shutdown<F: Future>(shutdown: &mut Shutdown, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = shutdown.requested() => None,
        out = fut => Some(out),
    }
}
