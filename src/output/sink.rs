// src/output/sink.rs

//! Where finished lines and diagnostics go.
//!
//! The consumer writes through a [`RenderSink`]; pipelines and the
//! coordinator report through a [`DiagnosticSink`]. Production uses stdout and
//! stderr; tests swap in capturing sinks.

use std::io::Write;

use tracing::warn;

use crate::errors::HostFailure;

use super::render::Renderer;

/// Receives rendered display lines, one call per line.
pub trait RenderSink: Send + 'static {
    fn emit(&mut self, line: &str);
}

/// Receives per-host failures and run-level notices.
pub trait DiagnosticSink: Send + Sync {
    /// One failed host, rendered as `[<host>] <cause>`.
    fn report(&self, failure: &HostFailure);

    /// A run-level message, e.g. that no host was selected.
    fn notice(&self, message: &str);
}

/// Writes each line to stdout and flushes, so output stays live when piped.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl RenderSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(error = %e, "failed to write to stdout");
        }
    }
}

/// Writes diagnostics to stderr.
#[derive(Debug, Clone, Copy)]
pub struct StderrDiagnostics {
    renderer: Renderer,
}

impl StderrDiagnostics {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

impl DiagnosticSink for StderrDiagnostics {
    fn report(&self, failure: &HostFailure) {
        eprintln!("{}", self.renderer.render_diagnostic(&failure.to_string()));
    }

    fn notice(&self, message: &str) {
        eprintln!("{}", self.renderer.render_diagnostic(message));
    }
}
