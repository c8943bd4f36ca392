// src/engine/mod.rs

//! Fan-in engine for remotetail.
//!
//! This module ties together:
//! - the bounded aggregator queue every pipeline feeds ([`queue`])
//! - the consumer that drains, filters and renders it ([`consumer`])
//! - join accounting for pipeline terminal states ([`ledger`])
//! - the lifecycle coordinator that launches, joins and shuts down
//!   ([`coordinator`])
//! - the run-wide shutdown signal ([`shutdown`])

use std::fmt;

use crate::types::HostName;

/// One host-tagged line of remote output.
///
/// Produced once per extracted line and consumed exactly once; arrival order
/// is the queue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMessage {
    pub host: HostName,
    pub content: String,
}

impl LineMessage {
    pub fn new(host: HostName, content: impl Into<String>) -> Self {
        Self {
            host,
            content: content.into(),
        }
    }
}

/// Lifecycle of one host pipeline.
///
/// `Connecting -> Authenticated -> Streaming -> {Closed | Failed}`. A pipeline
/// may also go straight from any non-terminal state to a terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Connecting,
    Authenticated,
    Streaming,
    Closed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Closed | PipelineState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.is_terminal() || next > self
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Connecting => "connecting",
            PipelineState::Authenticated => "authenticated",
            PipelineState::Streaming => "streaming",
            PipelineState::Closed => "closed",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

pub mod consumer;
pub mod coordinator;
pub mod ledger;
pub mod queue;
pub mod shutdown;

pub use consumer::{Consumer, ConsumerStats};
pub use coordinator::{Coordinator, CoordinatorOptions, RunSummary, NO_TARGETS_NOTICE};
pub use ledger::RunLedger;
pub use queue::{aggregator_queue, QueueClosed, QueueReceiver, QueueSender};
pub use shutdown::{escalate_interrupts, shutdown_channel, Shutdown, ShutdownTrigger};

#[cfg(test)]
mod tests {
    use super::PipelineState::*;

    #[test]
    fn pipeline_states_only_move_forward() {
        assert!(Connecting.can_advance_to(Authenticated));
        assert!(Authenticated.can_advance_to(Streaming));
        assert!(Streaming.can_advance_to(Closed));
        assert!(Connecting.can_advance_to(Failed));
        assert!(!Streaming.can_advance_to(Connecting));
        assert!(!Closed.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Closed));
    }
}
