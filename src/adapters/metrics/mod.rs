//! Metrics and Monitoring Adapters
//!
//! Provides Prometheus metrics export and the liveness/readiness
//! endpoints (/livez, /healthz) via axum 0.7 on a single port.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
