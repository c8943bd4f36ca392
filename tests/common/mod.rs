#![allow(dead_code)]

#[allow(unused_imports)]
pub use remotetail_test_utils::{builders, capture, fake_transport, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use remotetail::engine::{Coordinator, CoordinatorOptions, Shutdown};
use remotetail::session::Transport;

use self::capture::CapturedDiagnostics;

/// Options tuned for tests: small queue, short connect deadline.
pub fn test_options() -> CoordinatorOptions {
    CoordinatorOptions {
        queue_capacity: 4,
        connect_timeout: Duration::from_millis(500),
        idle_timeout: None,
    }
}

pub fn coordinator(
    transport: impl Transport + 'static,
    options: CoordinatorOptions,
    diagnostics: &Arc<CapturedDiagnostics>,
    shutdown: Shutdown,
) -> Coordinator {
    Coordinator::new(Arc::new(transport), options, diagnostics.clone(), shutdown)
}
