// src/engine/ledger.rs

//! Join accounting for one run.
//!
//! The ledger knows every host that was launched and records each pipeline's
//! terminal state exactly once. The coordinator only closes the queue once
//! [`RunLedger::all_terminal`] holds.
//!
//! Pure state: no channels, no Tokio, no IO.

use std::collections::BTreeMap;

use tracing::warn;

use super::PipelineState;

/// Why a terminal report was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    UnknownHost(String),
    AlreadyTerminal(String),
    NotTerminal(String, PipelineState),
}

#[derive(Debug, Default)]
pub struct RunLedger {
    hosts: BTreeMap<String, Option<PipelineState>>,
}

impl RunLedger {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(|h| (h.into(), None)).collect(),
        }
    }

    /// Record the terminal state of `host`.
    pub fn record(&mut self, host: &str, state: PipelineState) -> Result<(), LedgerError> {
        if !state.is_terminal() {
            return Err(LedgerError::NotTerminal(host.to_string(), state));
        }
        let slot = self
            .hosts
            .get_mut(host)
            .ok_or_else(|| LedgerError::UnknownHost(host.to_string()))?;
        if let Some(previous) = slot {
            warn!(host, ?previous, ?state, "pipeline reported terminal state twice");
            return Err(LedgerError::AlreadyTerminal(host.to_string()));
        }
        *slot = Some(state);
        Ok(())
    }

    pub fn all_terminal(&self) -> bool {
        self.hosts.values().all(Option::is_some)
    }

    /// Hosts still waiting for a terminal report.
    pub fn outstanding(&self) -> Vec<&str> {
        self.hosts
            .iter()
            .filter(|(_, s)| s.is_none())
            .map(|(h, _)| h.as_str())
            .collect()
    }

    pub fn count(&self, state: PipelineState) -> usize {
        self.hosts.values().filter(|s| **s == Some(state)).count()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_terminal_only_after_every_host_reports() {
        let mut ledger = RunLedger::new(["a", "b"]);
        assert!(!ledger.all_terminal());

        ledger.record("a", PipelineState::Closed).unwrap();
        assert_eq!(ledger.outstanding(), vec!["b"]);
        assert!(!ledger.all_terminal());

        ledger.record("b", PipelineState::Failed).unwrap();
        assert!(ledger.all_terminal());
        assert_eq!(ledger.count(PipelineState::Closed), 1);
        assert_eq!(ledger.count(PipelineState::Failed), 1);
    }

    #[test]
    fn terminal_state_is_recorded_once() {
        let mut ledger = RunLedger::new(["a"]);
        ledger.record("a", PipelineState::Failed).unwrap();
        assert_eq!(
            ledger.record("a", PipelineState::Closed),
            Err(LedgerError::AlreadyTerminal("a".to_string()))
        );
        assert_eq!(ledger.count(PipelineState::Failed), 1);
    }

    #[test]
    fn rejects_unknown_hosts_and_non_terminal_states() {
        let mut ledger = RunLedger::new(["a"]);
        assert_eq!(
            ledger.record("zz", PipelineState::Closed),
            Err(LedgerError::UnknownHost("zz".to_string()))
        );
        assert_eq!(
            ledger.record("a", PipelineState::Streaming),
            Err(LedgerError::NotTerminal("a".to_string(), PipelineState::Streaming))
        );
        assert!(!ledger.all_terminal());
    }

    #[test]
    fn empty_ledger_is_trivially_terminal() {
        let ledger = RunLedger::new(Vec::<String>::new());
        assert!(ledger.is_empty());
        assert!(ledger.all_terminal());
    }
}
