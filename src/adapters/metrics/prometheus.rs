//! Prometheus Metrics Registry - Forwarder Observability
//!
//! Holds the per-component health gauge and per-unit supervisor
//! gauges. Values are re-set on every scrape; rendering uses the
//! standard text exposition format.

use std::fmt;

use prometheus::{Encoder, GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::domain::health::FlattenedHealth;
use crate::domain::process::ExitState;

/// Metric namespace shared by every series.
pub const NAMESPACE: &str = "splunk_forwarder";

/// Prometheus metrics for the sidecar.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// `splunk_forwarder_component_unhealthy{component}`: 0 healthy, 1 not.
    pub component_unhealthy: GaugeVec,
    /// `splunk_forwarder_unit_up{unit}`: 1 while the unit's process runs.
    pub unit_up: IntGaugeVec,
    /// `splunk_forwarder_unit_restarts{unit}`: restarts since sidecar start.
    pub unit_restarts: IntGaugeVec,
}

impl MetricsRegistry {
    /// Create and register all metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let component_unhealthy = GaugeVec::new(
            Opts::new("unhealthy", "Whether a splunkd health component is not green (1) or green (0)")
                .namespace(NAMESPACE)
                .subsystem("component"),
            &["component"],
        )?;

        let unit_up = IntGaugeVec::new(
            Opts::new("up", "Whether the supervised unit's process is running")
                .namespace(NAMESPACE)
                .subsystem("unit"),
            &["unit"],
        )?;

        let unit_restarts = IntGaugeVec::new(
            Opts::new("restarts", "Restarts of the supervised unit since sidecar start")
                .namespace(NAMESPACE)
                .subsystem("unit"),
            &["unit"],
        )?;

        registry.register(Box::new(component_unhealthy.clone()))?;
        registry.register(Box::new(unit_up.clone()))?;
        registry.register(Box::new(unit_restarts.clone()))?;

        Ok(Self {
            registry,
            component_unhealthy,
            unit_up,
            unit_restarts,
        })
    }

    /// Drop every component label emitted so far.
    pub fn reset_components(&self) {
        self.component_unhealthy.reset();
    }

    /// Set one gauge per snapshot entry.
    pub fn record_components(&self, snapshot: &FlattenedHealth) {
        for (path, status) in snapshot {
            let value = if status.is_healthy() { 0.0 } else { 1.0 };
            self.component_unhealthy
                .with_label_values(&[path.as_str()])
                .set(value);
        }
    }

    /// Record a supervised unit's state.
    pub fn record_unit(&self, unit: &str, state: ExitState, restarts: u64) {
        self.unit_up
            .with_label_values(&[unit])
            .set(i64::from(state == ExitState::Running));
        self.unit_restarts
            .with_label_values(&[unit])
            .set(i64::try_from(restarts).unwrap_or(i64::MAX));
    }

    /// Content type of `render()` output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Encode every registered metric in the text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("namespace", &NAMESPACE)
            .field("families", &self.registry.gather().len())
            .finish_non_exhaustive()
    }
}
