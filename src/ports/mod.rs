//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `HealthSource`: Health document retrieval from the monitored service

pub mod health_source;

pub use health_source::{HealthDocument, HealthEntry, HealthError, HealthSource};
