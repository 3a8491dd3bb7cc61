//! Configuration Module - TOML-based Sidecar Configuration
//!
//! Loads and validates configuration from `sidecar.toml` with
//! environment variable overrides. Paths, ports and the upstream
//! health endpoint are externalized here; the built-in defaults
//! match the stock forwarder image layout.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::process::ProcessSpec;

/// Placeholder expanded to `splunkd.home` inside configured paths.
pub const SPLUNK_HOME_VAR: &str = "${SPLUNK_HOME}";

/// Top-level sidecar configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Logging and identity.
  pub sidecar: SidecarConfig,
  /// Monitored service location and credentials.
  pub splunkd: SplunkdConfig,
  /// Restart policy and log follower.
  pub supervisor: SupervisorConfig,
  /// Health/metrics HTTP server.
  pub server: ServerConfig,
}

/// Sidecar identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
}

/// Monitored service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplunkdConfig {
  /// Installation root, substituted for `${SPLUNK_HOME}`.
  pub home: String,
  /// Service binary, relative to `home` via `${SPLUNK_HOME}`.
  pub binary: String,
  /// Management port host:port (plain HTTP, loopback only).
  pub host: String,
  /// REST path of the health details endpoint.
  pub health_path: String,
  /// Admin username for basic auth.
  pub username: String,
  /// Admin password; normally injected via `SPLUNK_PASSWORD`.
  pub password: String,
  /// Upper bound on one health round trip (milliseconds).
  pub timeout_ms: u64,
}

/// Restart policy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
  /// Fixed delay between a unit exiting and its restart (seconds).
  pub restart_delay_secs: u64,
  /// Line-following utility.
  pub tail_binary: String,
  /// Log file followed by the tail unit.
  pub tail_path: String,
}

/// Health/metrics server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Bind address for `/metrics`, `/livez`, `/healthz`.
  pub bind_address: String,
}

impl Default for SidecarConfig {
  fn default() -> Self {
    Self {
      log_level: "info".to_string(),
    }
  }
}

impl Default for SplunkdConfig {
  fn default() -> Self {
    Self {
      home: "/opt/splunkforwarder".to_string(),
      binary: "${SPLUNK_HOME}/bin/splunk".to_string(),
      host: "127.0.0.1:8089".to_string(),
      health_path: "/services/server/health/splunkd/details".to_string(),
      username: "admin".to_string(),
      password: String::new(),
      timeout_ms: 5_000,
    }
  }
}

impl Default for SupervisorConfig {
  fn default() -> Self {
    Self {
      restart_delay_secs: 5,
      tail_binary: "/usr/bin/tail".to_string(),
      tail_path: "${SPLUNK_HOME}/var/log/splunk/splunkd.log".to_string(),
    }
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: "0.0.0.0:8090".to_string(),
    }
  }
}

impl SplunkdConfig {
  /// Full URL of the health endpoint, requesting JSON output.
  pub fn health_url(&self) -> String {
    format!("http://{}{}?output_mode=json", self.host, self.health_path)
  }

  /// Health round-trip timeout.
  pub const fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  /// Replace `${SPLUNK_HOME}` in a configured path.
  pub fn expand(&self, path: &str) -> String {
    path.replace(SPLUNK_HOME_VAR, &self.home)
  }
}

impl SupervisorConfig {
  /// Delay between restarts.
  pub const fn restart_delay(&self) -> Duration {
    Duration::from_secs(self.restart_delay_secs)
  }
}

impl AppConfig {
  /// `splunk start --answer-yes --nodaemon <passthrough>`.
  pub fn service_spec(&self, passthrough: &[String]) -> ProcessSpec {
    let mut args: Vec<String> = ["start", "--answer-yes", "--nodaemon"]
      .into_iter()
      .map(String::from)
      .collect();
    args.extend(passthrough.iter().cloned());
    ProcessSpec::new(self.splunkd.expand(&self.splunkd.binary), args)
  }

  /// `tail -F <splunkd.log>`.
  pub fn tail_spec(&self) -> ProcessSpec {
    ProcessSpec::new(
      self.supervisor.tail_binary.clone(),
      ["-F".to_string(), self.splunkd.expand(&self.supervisor.tail_path)],
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_health_url() {
    let cfg = SplunkdConfig::default();
    assert_eq!(
      cfg.health_url(),
      "http://127.0.0.1:8089/services/server/health/splunkd/details?output_mode=json"
    );
  }

  #[test]
  fn test_service_spec_appends_passthrough() {
    let cfg = AppConfig::default();
    let spec = cfg.service_spec(&["--accept-license".to_string()]);
    assert_eq!(spec.program, "/opt/splunkforwarder/bin/splunk");
    assert_eq!(
      spec.args,
      vec!["start", "--answer-yes", "--nodaemon", "--accept-license"]
    );
  }

  #[test]
  fn test_tail_spec_expands_home() {
    let spec = AppConfig::default().tail_spec();
    assert_eq!(spec.program, "/usr/bin/tail");
    assert_eq!(
      spec.args,
      vec!["-F", "/opt/splunkforwarder/var/log/splunk/splunkd.log"]
    );
  }
}
