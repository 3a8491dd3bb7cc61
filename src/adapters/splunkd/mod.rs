//! splunkd Management API Adapter
//!
//! Implements `HealthSource` against the forwarder's local REST API.

pub mod client;

pub use client::SplunkdClient;
