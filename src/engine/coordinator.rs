// src/engine/coordinator.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{HostTarget, RunSettings, DEFAULT_QUEUE_CAPACITY};
use crate::errors::HostFailure;
use crate::output::{DiagnosticSink, RenderSink, Renderer};
use crate::pipeline::{run_pipeline, PipelineContext, PipelineReport, PipelineSettings};
use crate::session::Transport;
use crate::types::HostName;

use super::consumer::Consumer;
use super::ledger::RunLedger;
use super::queue::aggregator_queue;
use super::shutdown::Shutdown;
use super::PipelineState;

/// Notice emitted when a run is started with nothing to tail.
pub const NO_TARGETS_NOTICE: &str = "No target host is available";

/// Knobs for one run, usually taken from `[config]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub queue_capacity: usize,
    pub connect_timeout: Duration,
    pub idle_timeout: Option<Duration>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
        }
    }
}

impl From<&RunSettings> for CoordinatorOptions {
    fn from(settings: &RunSettings) -> Self {
        Self {
            queue_capacity: settings.queue_capacity,
            connect_timeout: settings.connect_timeout,
            idle_timeout: settings.idle_timeout,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub hosts: usize,
    pub closed: usize,
    pub failed: usize,
    pub rendered: u64,
    pub filtered: u64,
    /// Per-host reports in launch order.
    pub reports: Vec<PipelineReport>,
}

/// Launches one pipeline per target, joins them all, then waits for the
/// consumer to drain the queue.
///
/// The queue closes only when every pipeline has released its sender, so the
/// consumer finishing means every line that was produced has been rendered.
pub struct Coordinator {
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn DiagnosticSink>,
    options: CoordinatorOptions,
    shutdown: Shutdown,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        options: CoordinatorOptions,
        diagnostics: Arc<dyn DiagnosticSink>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            transport,
            diagnostics,
            options,
            shutdown,
        }
    }

    /// Run every target to a terminal state and render their output.
    ///
    /// Never fails: per-host problems are reported through the diagnostic
    /// sink and counted in the summary.
    pub async fn run<S: RenderSink>(
        self,
        targets: Vec<Arc<HostTarget>>,
        renderer: Renderer,
        sink: S,
    ) -> RunSummary {
        if targets.is_empty() {
            warn!("no targets selected; nothing to tail");
            self.diagnostics.notice(NO_TARGETS_NOTICE);
            return RunSummary::default();
        }

        info!(
            hosts = targets.len(),
            queue_capacity = self.options.queue_capacity,
            "remotetail run started"
        );

        let (sender, receiver) = aggregator_queue(self.options.queue_capacity);
        let consumer = tokio::spawn(Consumer::new(receiver, renderer, sink).run());

        let ctx = PipelineContext {
            transport: self.transport.clone(),
            diagnostics: self.diagnostics.clone(),
            settings: PipelineSettings {
                connect_timeout: self.options.connect_timeout,
                idle_timeout: self.options.idle_timeout,
            },
            shutdown: self.shutdown.clone(),
        };

        let mut ledger = RunLedger::new(targets.iter().map(|t| t.name.clone()));
        let mut launched: Vec<(HostName, JoinHandle<PipelineReport>)> =
            Vec::with_capacity(targets.len());

        for target in targets {
            let host: HostName = Arc::from(target.name.as_str());
            debug!(host = %host, "launching pipeline");
            let handle = tokio::spawn(run_pipeline(ctx.clone(), target, sender.clone()));
            launched.push((host, handle));
        }
        // Only pipelines hold senders from here on.
        drop(sender);
        drop(ctx);

        let mut reports = Vec::with_capacity(launched.len());
        for (host, handle) in launched {
            let report = match handle.await {
                Ok(report) => report,
                Err(join_err) => {
                    error!(host = %host, error = %join_err, "pipeline task did not complete");
                    let failure =
                        HostFailure::stream(&*host, format!("pipeline aborted: {join_err}"));
                    self.diagnostics.report(&failure);
                    PipelineReport::aborted(host, failure)
                }
            };

            if let Err(e) = ledger.record(&report.host, report.state) {
                warn!(host = %report.host, error = ?e, "pipeline report rejected");
            }
            reports.push(report);
        }
        debug_assert!(
            ledger.all_terminal(),
            "no terminal report for {:?}",
            ledger.outstanding()
        );

        let stats = match consumer.await {
            Ok(stats) => stats,
            Err(join_err) => {
                error!(error = %join_err, "consumer task did not complete");
                Default::default()
            }
        };

        let summary = RunSummary {
            hosts: ledger.len(),
            closed: ledger.count(PipelineState::Closed),
            failed: ledger.count(PipelineState::Failed),
            rendered: stats.rendered,
            filtered: stats.filtered,
            reports,
        };
        info!(
            hosts = summary.hosts,
            closed = summary.closed,
            failed = summary.failed,
            rendered = summary.rendered,
            "remotetail run finished"
        );
        summary
    }
}
