//! Shutdown Coordinator — One-shot Process-wide Cancellation
//!
//! Armed by SIGINT/SIGTERM. Every supervised unit holds a clone and
//! checks it before each restart decision. The flag transitions once
//! and never resets; later termination requests are no-ops.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Cloneable handle to the shared cancellation flag.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    /// Create an un-cancelled coordinator.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Start listening for termination signals in the background.
    ///
    /// The first SIGINT or SIGTERM cancels; subsequent ones are ignored.
    pub fn arm(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = coordinator.listen().await {
                error!(error = %e, "Failed to install termination signal handlers");
            }
        })
    }

    #[cfg(unix)]
    async fn listen(&self) -> std::io::Result<()> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        let mut interrupt = signal(SignalKind::interrupt())?;

        loop {
            let name = tokio::select! {
                _ = terminate.recv() => "SIGTERM",
                _ = interrupt.recv() => "SIGINT",
            };
            self.request(name);
        }
    }

    #[cfg(not(unix))]
    async fn listen(&self) -> std::io::Result<()> {
        loop {
            tokio::signal::ctrl_c().await?;
            self.request("ctrl-c");
        }
    }

    fn request(&self, source: &str) {
        if self.cancel() {
            info!(signal = source, "Termination requested, shutting down");
        } else {
            debug!(signal = source, "Termination already in progress");
        }
    }

    /// Cancel. Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancelled (immediately if already cancelled).
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_starts_uncancelled() {
        let shutdown = ShutdownCoordinator::new();
        assert!(!shutdown.is_cancelled());
    }

    #[test]
    fn test_cancel_is_one_shot() {
        let shutdown = ShutdownCoordinator::new();
        assert!(shutdown.cancel());
        assert!(!shutdown.cancel());
        assert!(shutdown.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let shutdown = ShutdownCoordinator::new();
        let observer = shutdown.clone();
        shutdown.cancel();
        assert!(observer.is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_returns_after_cancel() {
        let shutdown = ShutdownCoordinator::new();
        let waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("wait did not resolve")
            .unwrap();
    }

    #[test]
    fn test_wait_wakes_on_cancel() {
        let shutdown = ShutdownCoordinator::new();
        let mut wait = tokio_test::task::spawn(shutdown.wait());

        tokio_test::assert_pending!(wait.poll());
        shutdown.cancel();
        assert!(wait.is_woken());
        tokio_test::assert_ready!(wait.poll());
    }

    #[tokio::test]
    async fn test_wait_when_already_cancelled() {
        let shutdown = ShutdownCoordinator::new();
        shutdown.cancel();
        tokio::time::timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .expect("wait should resolve immediately");
    }
}
