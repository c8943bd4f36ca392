// src/engine/queue.rs

//! The aggregator queue: bounded fan-in of tagged lines from every pipeline.
//!
//! Semantics:
//! - FIFO delivery in enqueue order.
//! - A full queue suspends the producer until the consumer makes room;
//!   nothing is ever discarded.
//! - The queue closes when the last [`QueueSender`] is dropped. The consumer
//!   then drains what is left and sees `None`.
//!
//! Lines from one host stay in order because each host has a single,
//! sequential producer. There is no ordering across hosts.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

use super::LineMessage;

/// The consumer went away; the line could not be delivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("aggregator queue closed; line from {} dropped", .0.host)]
pub struct QueueClosed(pub LineMessage);

/// Create a queue holding at most `capacity` undelivered lines.
///
/// `capacity` is clamped to at least 1.
pub fn aggregator_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer handle; one clone per pipeline.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<LineMessage>,
}

impl QueueSender {
    /// Enqueue a line, waiting for room if the queue is full.
    pub async fn enqueue(&self, msg: LineMessage) -> Result<(), QueueClosed> {
        if self.available() == 0 {
            trace!(host = %msg.host, "aggregator queue full; waiting");
        }
        self.tx.send(msg).await.map_err(|e| QueueClosed(e.0))
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer handle; exactly one exists.
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<LineMessage>,
}

impl QueueReceiver {
    /// Next line, or `None` once every sender is gone and the queue is empty.
    pub async fn dequeue(&mut self) -> Option<LineMessage> {
        self.rx.recv().await
    }
}
