//! Forwarder Sidecar — Entry Point
//!
//! Supervises splunkd and a `tail -F` of its log, and serves
//! /livez, /healthz and /metrics. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load sidecar.toml (or defaults) + env overrides
//! 2. Init tracing (JSON structured logging)
//! 3. Arm the shutdown coordinator on SIGINT/SIGTERM
//! 4. Create the splunkd health client and monitor
//! 5. Spawn health/metrics server on :8090
//! 6. Spawn the splunkd and tail supervisors
//! 7. Wait for both supervisors to stop, then stop the server
//!
//! Seeding the admin password and writing server.conf happen before
//! this binary starts; the password arrives via `SPLUNK_PASSWORD`.

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use forwarder_sidecar::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use forwarder_sidecar::adapters::splunkd::SplunkdClient;
use forwarder_sidecar::config;
use forwarder_sidecar::usecases::{HealthMonitor, ShutdownCoordinator, Supervisor};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_from_env().context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.sidecar.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        splunkd = %config.splunkd.host,
        bind = %config.server.bind_address,
        restart_delay_secs = config.supervisor.restart_delay_secs,
        "Starting forwarder sidecar"
    );

    // ── 3. Shutdown coordinator ─────────────────────────────
    let shutdown = ShutdownCoordinator::new();
    let signal_handle = shutdown.arm();

    // ── 4. Health client + monitor ──────────────────────────
    if config.splunkd.password.is_empty() {
        warn!("SPLUNK_PASSWORD not set, health checks will likely be rejected");
    }
    let client = SplunkdClient::new(&config.splunkd).context("Failed to create splunkd client")?;
    info!(url = %client.url(), "splunkd health endpoint configured");
    let monitor = Arc::new(HealthMonitor::new(Arc::new(client)));
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);

    let restart_delay = config.supervisor.restart_delay();
    let service = Arc::new(Supervisor::new("splunkd", restart_delay, shutdown.clone()));
    let tail = Arc::new(Supervisor::new("tail", restart_delay, shutdown.clone()));

    // ── 5. Health/metrics server ────────────────────────────
    let server = HealthServer::new(
        HealthState {
            monitor,
            metrics,
            service: Arc::clone(&service),
            units: vec![Arc::clone(&service), Arc::clone(&tail)],
        },
        config.server.bind_address.clone(),
    );
    let server_shutdown = shutdown.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run(server_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    // ── 6. Supervisors ──────────────────────────────────────
    let passthrough: Vec<String> = std::env::args().skip(1).collect();
    let service_spec = config.service_spec(&passthrough);
    let tail_spec = config.tail_spec();
    info!(command = %service_spec, "splunkd command");

    let service_handle = tokio::spawn(async move { service.run(|| service_spec.spawn()).await });
    let tail_handle = tokio::spawn(async move { tail.run(|| tail_spec.spawn()).await });

    info!("All units spawned — sidecar is running");

    // ── 7. Wait for shutdown to propagate ───────────────────
    let (service_result, tail_result) = tokio::join!(service_handle, tail_handle);
    for (unit, result) in [("splunkd", service_result), ("tail", tail_result)] {
        match result {
            Ok(true) => info!(unit, "Unit stopped for shutdown"),
            Ok(false) => warn!(unit, "Unit stopped without shutdown"),
            Err(e) => error!(unit, error = %e, "Unit task failed"),
        }
    }

    // In-flight requests get a moment; the server must not hold up exit.
    if tokio::time::timeout(Duration::from_secs(2), server_handle)
        .await
        .is_err()
    {
        warn!("Health server did not stop in time, exiting anyway");
    }
    signal_handle.abort();

    info!("Shutdown complete");
    Ok(())
}
