//! Health Check Server - Liveness, Readiness and Metrics
//!
//! Exposes `/livez`, `/healthz` and `/metrics` via axum 0.7 for the
//! container orchestrator and Prometheus. Readiness and metrics poll
//! splunkd on every request; liveness only looks at the supervised
//! splunkd process.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info, instrument};

use super::prometheus::MetricsRegistry;
use crate::usecases::health_monitor::HealthMonitor;
use crate::usecases::shutdown::ShutdownCoordinator;
use crate::usecases::supervisor::Supervisor;

const OK: &str = "ok";
const NOT_OK: &str = "not ok";

/// State shared by all handlers.
#[derive(Clone, Debug)]
pub struct HealthState {
    /// splunkd health poller.
    pub monitor: Arc<HealthMonitor>,
    /// Prometheus registry.
    pub metrics: Arc<MetricsRegistry>,
    /// Supervisor of the splunkd process (liveness source).
    pub service: Arc<Supervisor>,
    /// Every supervised unit, exported as unit gauges.
    pub units: Vec<Arc<Supervisor>>,
}

/// Axum-based health and metrics HTTP server.
pub struct HealthServer {
    /// Handler state.
    state: HealthState,
    /// Bind address (default `0.0.0.0:8090`).
    bind_address: String,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(state: HealthState, bind_address: impl Into<String>) -> Self {
        Self {
            state,
            bind_address: bind_address.into(),
        }
    }

    /// Build the router.
    pub fn router(state: HealthState) -> Router {
        Router::new()
            .route("/metrics", get(Self::metrics))
            .route("/livez", get(Self::liveness))
            .route("/healthz", get(Self::readiness))
            .with_state(state)
    }

    /// Serve until shutdown is requested.
    #[instrument(skip(self, shutdown), fields(address = %self.bind_address))]
    pub async fn run(self, shutdown: ShutdownCoordinator) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        info!("Health server started");

        axum::serve(listener, Self::router(self.state))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        Ok(())
    }

    /// Metrics: poll, refresh gauges, render.
    ///
    /// Stale component labels are only dropped when the poll reports
    /// healthy; on an unhealthy poll previously seen components linger.
    async fn metrics(State(state): State<HealthState>) -> Response {
        if state.monitor.check().await {
            state.metrics.reset_components();
        }
        state
            .metrics
            .record_components(&state.monitor.snapshot().await);

        for unit in &state.units {
            state
                .metrics
                .record_unit(unit.name(), unit.exit_state().await, unit.restarts());
        }

        match state.metrics.render() {
            Ok(body) => (
                [(header::CONTENT_TYPE, state.metrics.content_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }

    /// Liveness: 500 once the splunkd process has exited on its own.
    ///
    /// A signalled process (killed, or stopped for shutdown) stays live.
    async fn liveness(State(state): State<HealthState>) -> impl IntoResponse {
        if state.service.exit_state().await.has_exited() {
            (StatusCode::INTERNAL_SERVER_ERROR, NOT_OK)
        } else {
            (StatusCode::OK, OK)
        }
    }

    /// Readiness: 200 only if splunkd reports green.
    ///
    /// `?verbose` appends one `[+]<component> <ok|not ok>` line per
    /// entry of the current snapshot.
    async fn readiness(
        State(state): State<HealthState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let healthy = state.monitor.check().await;
        let (status, mut body) = if healthy {
            (StatusCode::OK, OK.to_string())
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, NOT_OK.to_string())
        };

        if params.contains_key("verbose") {
            for (path, component) in &state.monitor.snapshot().await {
                let verdict = if component.is_healthy() { OK } else { NOT_OK };
                let _ = write!(body, "\n[+]{path} {verdict}");
            }
            body.push('\n');
        }

        (status, body)
    }
}
