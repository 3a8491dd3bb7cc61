//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `sidecar.toml`, applying environment overrides,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SIDECAR_CONFIG";

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "sidecar.toml";

/// Env var carrying the admin password generated at container start.
pub const PASSWORD_ENV: &str = "SPLUNK_PASSWORD";

/// Env var overriding the installation root.
pub const HOME_ENV: &str = "SPLUNK_HOME";

/// Load configuration from the path in `SIDECAR_CONFIG` (or the default).
///
/// A missing file is not an error: built-in defaults are used.
pub fn load_from_env() -> Result<AppConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
  let mut config = if Path::new(&path).exists() {
    load_config(&path)?
  } else {
    AppConfig::default()
  };

  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;
  Ok(config)
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    path = %path.display(),
    splunkd = %config.splunkd.host,
    bind = %config.server.bind_address,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse sidecar.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Apply environment overrides using the supplied lookup.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(password) = lookup(PASSWORD_ENV).filter(|p| !p.is_empty()) {
    config.splunkd.password = password;
  }
  if let Some(home) = lookup(HOME_ENV).filter(|h| !h.is_empty()) {
    config.splunkd.home = home;
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.splunkd.host.is_empty(),
    "splunkd.host must not be empty"
  );
  anyhow::ensure!(
    config.splunkd.health_path.starts_with('/'),
    "splunkd.health_path must start with '/', got {}",
    config.splunkd.health_path
  );
  anyhow::ensure!(
    config.splunkd.timeout_ms > 0,
    "splunkd.timeout_ms must be positive"
  );
  anyhow::ensure!(
    !config.splunkd.username.is_empty(),
    "splunkd.username must not be empty"
  );
  anyhow::ensure!(
    config.supervisor.restart_delay_secs > 0,
    "supervisor.restart_delay_secs must be positive"
  );
  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "server.bind_address must not be empty"
  );

  Ok(())
}
