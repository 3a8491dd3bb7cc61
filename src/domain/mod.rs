//! Domain layer - Health tree and process lifecycle models.
//!
//! Pure types with no I/O beyond launching a described process.
//! Everything here is testable in isolation.

pub mod health;
pub mod process;

pub use health::{FlattenedHealth, HealthNode, HealthReason, HealthStatus, sanitize};
pub use process::{ExitState, ProcessSpec};
