//! Process Supervisor — Restart-on-exit Control Loop
//!
//! Owns one unit's lifecycle: spawn, wait for exit or shutdown,
//! restart after a fixed delay. Restart attempts for a unit are
//! strictly sequential; no two instances ever overlap.
//!
//! The fixed delay gives no protection against restart storms beyond
//! one attempt per delay period. Spawn failures go through the same
//! delay so a missing binary cannot busy-loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use super::shutdown::ShutdownCoordinator;
use crate::domain::process::ExitState;

/// Default delay between an exit and the next spawn.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

/// Restart-unless-cancelled supervisor for one unit.
#[derive(Debug)]
pub struct Supervisor {
    /// Unit name for logs and metrics.
    name: String,
    /// Fixed delay between restarts.
    restart_delay: Duration,
    /// Shared cancellation.
    shutdown: ShutdownCoordinator,
    /// Last observed state; written here, read by the HTTP handlers.
    state: RwLock<ExitState>,
    /// Number of restarts performed (first spawn excluded).
    restarts: AtomicU64,
}

impl Supervisor {
    /// Create a supervisor for the named unit.
    pub fn new(name: impl Into<String>, restart_delay: Duration, shutdown: ShutdownCoordinator) -> Self {
        Self {
            name: name.into(),
            restart_delay,
            shutdown,
            state: RwLock::new(ExitState::NotStarted),
            restarts: AtomicU64::new(0),
        }
    }

    /// Unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state of the unit.
    pub async fn exit_state(&self) -> ExitState {
        *self.state.read().await
    }

    /// Restarts performed so far.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    async fn set_state(&self, state: ExitState) {
        *self.state.write().await = state;
    }

    /// Run the unit until shutdown.
    ///
    /// Returns `true` when the loop ended because of the shutdown
    /// signal, which is the only way it ends.
    #[instrument(skip(self, spawn), fields(unit = %self.name))]
    pub async fn run<F>(&self, mut spawn: F) -> bool
    where
        F: FnMut() -> std::io::Result<Child> + Send,
    {
        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown in progress, not spawning");
                return true;
            }

            match spawn() {
                Ok(child) => {
                    if self.watch_child(child).await {
                        return true;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to spawn process");
                    self.set_state(ExitState::Exited(None)).await;
                }
            }

            if self.shutdown.is_cancelled() {
                return true;
            }

            info!(
                delay_ms = u64::try_from(self.restart_delay.as_millis()).unwrap_or(u64::MAX),
                "Process exited, restarting after delay"
            );

            tokio::select! {
                biased;
                () = self.shutdown.wait() => {
                    info!("Shutdown during restart delay");
                    return true;
                }
                () = tokio::time::sleep(self.restart_delay) => {}
            }

            self.restarts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Wait for one child instance. Returns `true` if shutdown ended it.
    async fn watch_child(&self, mut child: Child) -> bool {
        self.set_state(ExitState::Running).await;
        info!(pid = child.id(), "Process started");

        tokio::select! {
            status = child.wait() => {
                let state = match status {
                    Ok(status) => ExitState::from_status(status),
                    Err(e) => {
                        warn!(error = %e, "Failed to wait on process");
                        ExitState::Exited(None)
                    }
                };
                info!(state = %state, "Process exited");
                self.set_state(state).await;
                false
            }
            () = self.shutdown.wait() => {
                info!("Terminating process for shutdown");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to terminate process");
                }
                self.set_state(ExitState::Killed).await;
                true
            }
        }
    }
}
