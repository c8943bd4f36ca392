// src/pipeline/mod.rs

//! Per-host pipelines.
//!
//! A pipeline is launcher -> extractor, wrapped by the isolator:
//!
//! - [`launcher`] builds the remote `tail` command, connects and starts it.
//! - [`extractor`] splits the remote output into lines and feeds the
//!   aggregator queue.
//! - [`isolator`] runs both under the connect deadline and the shutdown
//!   signal, and turns any failure into a diagnostic plus a `Failed` report.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{PipelineState, Shutdown};
use crate::errors::HostFailure;
use crate::output::DiagnosticSink;
use crate::session::Transport;
use crate::types::HostName;

pub mod extractor;
pub mod isolator;
pub mod launcher;

pub use extractor::{forward_lines, LineSplitter};
pub use isolator::run_pipeline;
pub use launcher::tail_command;

/// Per-host time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Bound on connect + authenticate + pty + command start.
    pub connect_timeout: Duration,
    /// Fail the host after this long without output. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
        }
    }
}

/// Everything a pipeline shares with its siblings.
#[derive(Clone)]
pub struct PipelineContext {
    pub transport: Arc<dyn Transport>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub settings: PipelineSettings,
    pub shutdown: Shutdown,
}

/// Terminal report of one pipeline, delivered through the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub host: HostName,
    /// Always `Closed` or `Failed`.
    pub state: PipelineState,
    pub lines_forwarded: u64,
    /// Closed because shutdown was requested rather than by end of output.
    pub cancelled: bool,
    pub failure: Option<HostFailure>,
}

impl PipelineReport {
    /// Report for a pipeline task that died without reporting (e.g. panicked).
    pub fn aborted(host: HostName, failure: HostFailure) -> Self {
        Self {
            host,
            state: PipelineState::Failed,
            lines_forwarded: 0,
            cancelled: false,
            failure: Some(failure),
        }
    }
}
