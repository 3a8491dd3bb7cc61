//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies, and hosts the inbound HTTP surface.
//!
//! Adapter categories:
//! - `splunkd`: splunkd management REST client (health source)
//! - `metrics`: Prometheus metrics export and health endpoints

pub mod metrics;
pub mod splunkd;
