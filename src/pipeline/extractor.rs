// src/pipeline/extractor.rs

//! Line extractor: raw remote output in, host-tagged lines out.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, trace};

use crate::engine::{LineMessage, QueueSender};
use crate::errors::HostFailure;
use crate::session::OutputStream;
use crate::types::HostName;

/// Splits a byte stream on `\n` across arbitrary chunk boundaries.
///
/// A line is emitted as soon as its terminator arrives. The terminator itself
/// is not part of the line; a preceding `\r` is kept for the consumer to trim.
/// Bytes are decoded as UTF-8 once a line is complete, so multi-byte
/// characters split across chunks survive. Invalid sequences are replaced.
#[derive(Debug, Default)]
pub struct LineSplitter {
    partial: Vec<u8>,
}

impl LineSplitter {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.partial.extend_from_slice(&rest[..pos]);
            lines.push(String::from_utf8_lossy(&self.partial).into_owned());
            self.partial.clear();
            rest = &rest[pos + 1..];
        }

        self.partial.extend_from_slice(rest);
        lines
    }

    /// Whatever followed the last newline, if anything.
    pub fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        Some(line)
    }
}

/// Read `output` to its end, forwarding each line to the queue in order.
///
/// - Clean end of stream: `Ok(())`, after flushing a trailing partial line.
/// - Read failure or unsuccessful remote exit: the stream's `HostFailure`.
/// - No chunk within `idle_timeout` (when set): a stream failure.
///
/// `forwarded` counts delivered lines and stays accurate on failure.
pub async fn forward_lines(
    host: &HostName,
    output: &mut dyn OutputStream,
    queue: &QueueSender,
    idle_timeout: Option<Duration>,
    forwarded: &mut u64,
) -> Result<(), HostFailure> {
    let mut splitter = LineSplitter::default();

    loop {
        let next = match idle_timeout {
            Some(limit) => timeout(limit, output.next_chunk()).await.map_err(|_| {
                HostFailure::stream(&**host, format!("no output received for {limit:?}"))
            })?,
            None => output.next_chunk().await,
        };

        match next? {
            Some(chunk) => {
                trace!(host = %host, bytes = chunk.len(), "received output chunk");
                for line in splitter.push(&chunk) {
                    deliver(host, queue, line, forwarded).await?;
                }
            }
            None => {
                if let Some(line) = splitter.finish() {
                    deliver(host, queue, line, forwarded).await?;
                }
                debug!(host = %host, lines = *forwarded, "remote output ended");
                return Ok(());
            }
        }
    }
}

async fn deliver(
    host: &HostName,
    queue: &QueueSender,
    content: String,
    forwarded: &mut u64,
) -> Result<(), HostFailure> {
    queue
        .enqueue(LineMessage::new(host.clone(), content))
        .await
        .map_err(|_| HostFailure::stream(&**host, "output queue closed; consumer is gone"))?;
    *forwarded += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use super::*;
    use crate::engine::aggregator_queue;
    use crate::session::BoxFuture;

    struct Scripted {
        chunks: VecDeque<Result<Vec<u8>, HostFailure>>,
    }

    impl OutputStream for Scripted {
        fn next_chunk(&mut self) -> BoxFuture<'_, Result<Option<Vec<u8>>, HostFailure>> {
            let next = self.chunks.pop_front();
            Box::pin(async move { next.transpose() })
        }
    }

    #[test]
    fn splits_across_chunk_boundaries() {
        let mut s = LineSplitter::default();
        assert_eq!(s.push(b"first li"), Vec::<String>::new());
        assert_eq!(s.push(b"ne\r\nsecond\nthi"), vec!["first line\r", "second"]);
        assert_eq!(s.push(b"rd"), Vec::<String>::new());
        assert_eq!(s.finish(), Some("third".to_string()));
        assert_eq!(s.finish(), None);
    }

    #[test]
    fn keeps_multibyte_characters_split_between_chunks() {
        let bytes = "naïve\n".as_bytes();
        let mut s = LineSplitter::default();
        assert!(s.push(&bytes[..3]).is_empty());
        assert_eq!(s.push(&bytes[3..]), vec!["naïve"]);
    }

    #[tokio::test]
    async fn forwards_lines_in_order_then_trailing_partial() {
        let (tx, mut rx) = aggregator_queue(16);
        let host: HostName = Arc::from("h1");
        let mut output = Scripted {
            chunks: VecDeque::from(vec![Ok(b"a\nb".to_vec()), Ok(b"\nc".to_vec())]),
        };
        let mut n = 0;

        forward_lines(&host, &mut output, &tx, None, &mut n).await.unwrap();
        drop(tx);

        let mut got = Vec::new();
        while let Some(m) = rx.dequeue().await {
            assert_eq!(&*m.host, "h1");
            got.push(m.content);
        }
        assert_eq!(got, vec!["a", "b", "c"]);
        assert_eq!(n, 3);
    }

    #[tokio::test]
    async fn read_failure_surfaces_after_delivered_lines() {
        let (tx, _rx) = aggregator_queue(16);
        let host: HostName = Arc::from("h1");
        let mut output = Scripted {
            chunks: VecDeque::from(vec![
                Ok(b"one\n".to_vec()),
                Err(HostFailure::stream("h1", "connection reset")),
            ]),
        };
        let mut n = 0;

        let err = forward_lines(&host, &mut output, &tx, None, &mut n)
            .await
            .unwrap_err();
        assert_eq!(err.cause, "connection reset");
        assert_eq!(n, 1);
    }
}
