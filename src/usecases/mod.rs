//! Use Cases Layer - Supervision and Health Orchestration
//!
//! Coordinates domain types through port traits:
//! - `shutdown`: one-shot cancellation armed by termination signals
//! - `supervisor`: restart-on-exit loop for one child process
//! - `health_monitor`: health poll + flatten with last-good snapshot

pub mod health_monitor;
pub mod shutdown;
pub mod supervisor;

pub use health_monitor::HealthMonitor;
pub use shutdown::ShutdownCoordinator;
pub use supervisor::Supervisor;
