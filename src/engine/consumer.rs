// src/engine/consumer.rs

//! The single consumer of the aggregator queue.

use tracing::{debug, trace};

use crate::output::{clean_line, RenderSink, Renderer};

use super::queue::QueueReceiver;

/// What the consumer did before the queue closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub rendered: u64,
    pub filtered: u64,
}

/// Drains the queue until it is closed, filtering noise and rendering every
/// surviving line to the sink.
pub struct Consumer<S: RenderSink> {
    receiver: QueueReceiver,
    renderer: Renderer,
    sink: S,
}

impl<S: RenderSink> Consumer<S> {
    pub fn new(receiver: QueueReceiver, renderer: Renderer, sink: S) -> Self {
        Self {
            receiver,
            renderer,
            sink,
        }
    }

    /// Run until every producer is gone and the queue is empty.
    ///
    /// Returning is the completion signal the coordinator waits on.
    pub async fn run(mut self) -> ConsumerStats {
        let mut stats = ConsumerStats::default();

        while let Some(msg) = self.receiver.dequeue().await {
            match clean_line(&msg.content) {
                Some(content) => {
                    let line = self.renderer.render_line(&msg.host, content);
                    self.sink.emit(&line);
                    stats.rendered += 1;
                }
                None => {
                    trace!(host = %msg.host, "dropping noise line");
                    stats.filtered += 1;
                }
            }
        }

        debug!(
            rendered = stats.rendered,
            filtered = stats.filtered,
            "aggregator queue closed and drained"
        );
        stats
    }
}
