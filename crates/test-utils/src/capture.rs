use std::sync::{Arc, Mutex};

use remotetail::errors::HostFailure;
use remotetail::output::{DiagnosticSink, RenderSink};

/// `RenderSink` that keeps every emitted line; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines rendered for `host`, content only, in arrival order.
    ///
    /// Assumes plain rendering (`<host> -> <content>`).
    pub fn lines_for(&self, host: &str) -> Vec<String> {
        let prefix = format!("{host} -> ");
        self.lines()
            .into_iter()
            .filter_map(|l| l.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

impl RenderSink for CapturedOutput {
    fn emit(&mut self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// `DiagnosticSink` that keeps failures and notices apart.
#[derive(Debug, Default)]
pub struct CapturedDiagnostics {
    failures: Mutex<Vec<HostFailure>>,
    notices: Mutex<Vec<String>>,
}

impl CapturedDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failures(&self) -> Vec<HostFailure> {
        self.failures.lock().unwrap().clone()
    }

    pub fn failed_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.failures().into_iter().map(|f| f.host).collect();
        hosts.sort();
        hosts
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CapturedDiagnostics {
    fn report(&self, failure: &HostFailure) {
        self.failures.lock().unwrap().push(failure.clone());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}
