use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use remotetail::config::HostTarget;
use remotetail::errors::HostFailure;
use remotetail::session::{BoxFuture, OutputStream, RemoteSession, Transport};

/// What `connect` does for a host.
#[derive(Debug, Clone)]
pub enum ConnectBehaviour {
    Accept,
    Refuse(String),
    /// Never completes; only the connect deadline or shutdown ends it.
    Hang,
    Panic,
}

/// What the output stream does once its scripted chunks are exhausted.
#[derive(Debug, Clone)]
pub enum StreamEnding {
    Clean,
    Fail(String),
    /// Never yields again, like `tail -f` on a quiet file.
    Stall,
}

/// Scripted behaviour of one host.
#[derive(Debug, Clone)]
pub struct HostScript {
    connect: ConnectBehaviour,
    reject_command: Option<String>,
    chunks: Vec<Vec<u8>>,
    chunk_delay: Option<Duration>,
    ending: StreamEnding,
}

impl HostScript {
    /// Accepts, then emits each line (newline-terminated) and ends cleanly.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks = lines
            .into_iter()
            .map(|l| format!("{}\n", l.as_ref()).into_bytes())
            .collect();
        Self::chunks(chunks)
    }

    /// Accepts, then emits the raw chunks as-is and ends cleanly.
    pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            connect: ConnectBehaviour::Accept,
            reject_command: None,
            chunks,
            chunk_delay: None,
            ending: StreamEnding::Clean,
        }
    }

    pub fn refuse(cause: &str) -> Self {
        Self::lines(Vec::<String>::new()).connect(ConnectBehaviour::Refuse(cause.to_string()))
    }

    pub fn hang() -> Self {
        Self::lines(Vec::<String>::new()).connect(ConnectBehaviour::Hang)
    }

    pub fn panic() -> Self {
        Self::lines(Vec::<String>::new()).connect(ConnectBehaviour::Panic)
    }

    pub fn connect(mut self, behaviour: ConnectBehaviour) -> Self {
        self.connect = behaviour;
        self
    }

    pub fn reject_command(mut self, cause: &str) -> Self {
        self.reject_command = Some(cause.to_string());
        self
    }

    pub fn chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub fn then_fail(mut self, cause: &str) -> Self {
        self.ending = StreamEnding::Fail(cause.to_string());
        self
    }

    pub fn then_stall(mut self) -> Self {
        self.ending = StreamEnding::Stall;
        self
    }
}

/// Everything the fake saw, in call order.
#[derive(Debug, Default, Clone)]
pub struct TransportLog {
    pub connects: Vec<String>,
    /// `(host, command)` pairs.
    pub commands: Vec<(String, String)>,
    pub closed: Vec<String>,
    pub outputs_dropped: Vec<String>,
}

impl TransportLog {
    pub fn command_for(&self, host: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, c)| c.as_str())
    }
}

/// A `Transport` that plays back per-host scripts keyed by target name.
///
/// Hosts without a script are refused.
#[derive(Debug, Default)]
pub struct FakeTransport {
    scripts: HashMap<String, HostScript>,
    log: Arc<Mutex<TransportLog>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, name: &str, script: HostScript) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    /// Shared handle to the call log; stays valid after the transport moves.
    pub fn log(&self) -> Arc<Mutex<TransportLog>> {
        Arc::clone(&self.log)
    }
}

impl Transport for FakeTransport {
    fn connect<'a>(
        &'a self,
        target: &'a HostTarget,
    ) -> BoxFuture<'a, Result<Box<dyn RemoteSession>, HostFailure>> {
        Box::pin(async move {
            self.log.lock().unwrap().connects.push(target.name.clone());

            let script = match self.scripts.get(&target.name) {
                Some(s) => s.clone(),
                None => {
                    return Err(HostFailure::connection(
                        &target.name,
                        "unable to connect: no route to host",
                    ));
                }
            };

            match script.connect.clone() {
                ConnectBehaviour::Accept => Ok(Box::new(FakeSession {
                    host: target.name.clone(),
                    script,
                    log: Arc::clone(&self.log),
                }) as Box<dyn RemoteSession>),
                ConnectBehaviour::Refuse(cause) => Err(HostFailure::connection(&target.name, cause)),
                ConnectBehaviour::Hang => std::future::pending().await,
                ConnectBehaviour::Panic => panic!("scripted panic for {}", target.name),
            }
        })
    }
}

struct FakeSession {
    host: String,
    script: HostScript,
    log: Arc<Mutex<TransportLog>>,
}

impl RemoteSession for FakeSession {
    fn start_streaming_command<'a>(
        &'a mut self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn OutputStream>, HostFailure>> {
        Box::pin(async move {
            self.log
                .lock()
                .unwrap()
                .commands
                .push((self.host.clone(), command.to_string()));

            if let Some(ref cause) = self.script.reject_command {
                return Err(HostFailure::session(&self.host, cause.clone()));
            }

            Ok(Box::new(FakeOutput {
                host: self.host.clone(),
                chunks: self.script.chunks.iter().cloned().collect(),
                delay: self.script.chunk_delay,
                ending: self.script.ending.clone(),
                log: Arc::clone(&self.log),
            }) as Box<dyn OutputStream>)
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            self.log.lock().unwrap().closed.push(self.host.clone());
        })
    }
}

struct FakeOutput {
    host: String,
    chunks: VecDeque<Vec<u8>>,
    delay: Option<Duration>,
    ending: StreamEnding,
    log: Arc<Mutex<TransportLog>>,
}

impl OutputStream for FakeOutput {
    fn next_chunk(&mut self) -> BoxFuture<'_, Result<Option<Vec<u8>>, HostFailure>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(chunk) = self.chunks.pop_front() {
                return Ok(Some(chunk));
            }
            match self.ending {
                StreamEnding::Clean => Ok(None),
                StreamEnding::Fail(ref cause) => Err(HostFailure::stream(&self.host, cause.clone())),
                StreamEnding::Stall => std::future::pending().await,
            }
        })
    }
}

impl Drop for FakeOutput {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.outputs_dropped.push(self.host.clone());
        }
    }
}
