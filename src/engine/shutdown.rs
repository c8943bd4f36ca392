// src/engine/shutdown.rs

//! Run-wide shutdown signal shared by every pipeline.

use std::future::Future;
use std::io;

use tokio::sync::watch;
use tracing::{info, warn};

/// Create a linked trigger / signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Fires the shutdown. Dropping it without firing means "never".
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Cloneable view of the shutdown state.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_trigger, signal) = shutdown_channel();
        signal
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been triggered; pends forever if the trigger
    /// was dropped without firing.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Turn interrupts into shutdown: the first fires `trigger`, the second
/// makes this return so the caller can exit without waiting for the drain.
///
/// `next_interrupt` resolves once per interrupt, like `tokio::signal::ctrl_c`.
pub async fn escalate_interrupts<F, Fut>(
    trigger: ShutdownTrigger,
    mut next_interrupt: F,
) -> io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    next_interrupt().await?;
    info!("Ctrl+C received; shutting down (press again to exit immediately)");
    trigger.trigger();

    next_interrupt().await?;
    warn!("second Ctrl+C received; exiting without waiting for hosts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn trigger_wakes_every_clone() {
        let (trigger, signal) = shutdown_channel();
        let mut a = signal.clone();
        let mut b = signal;

        trigger.trigger();
        a.requested().await;
        b.requested().await;
        assert!(a.is_requested());
    }

    #[tokio::test]
    async fn never_does_not_fire() {
        let mut signal = Shutdown::never();
        let res = tokio::time::timeout(Duration::from_millis(20), signal.requested()).await;
        assert!(res.is_err());
        assert!(!signal.is_requested());
    }

    #[tokio::test]
    async fn first_interrupt_shuts_down_and_second_returns() {
        let (trigger, mut signal) = shutdown_channel();
        let interrupts = Arc::new(Notify::new());
        let source = Arc::clone(&interrupts);
        let escalation = tokio::spawn(escalate_interrupts(trigger, move || {
            let source = Arc::clone(&source);
            async move {
                source.notified().await;
                Ok(())
            }
        }));

        interrupts.notify_one();
        tokio::time::timeout(Duration::from_secs(1), signal.requested())
            .await
            .expect("first interrupt should request shutdown");
        assert!(!escalation.is_finished());

        interrupts.notify_one();
        let res = tokio::time::timeout(Duration::from_secs(1), escalation)
            .await
            .expect("second interrupt should end the escalation")
            .unwrap();
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn listener_error_is_returned_without_shutdown() {
        let (trigger, signal) = shutdown_channel();
        let res = escalate_interrupts(trigger, || async {
            Err(io::Error::other("no signal handler"))
        })
        .await;
        assert!(res.is_err());
        assert!(!signal.is_requested());
    }
}
