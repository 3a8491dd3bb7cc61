//! splunkd REST Client - Health Details Endpoint
//!
//! Wraps reqwest with basic auth and a bounded request timeout for
//! the loopback management port. Proxy env vars are ignored: they
//! configure splunkd's outbound traffic, not ours.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::SplunkdConfig;
use crate::ports::health_source::{HealthDocument, HealthError, HealthSource};

/// HTTP client for `/services/server/health/splunkd/details`.
pub struct SplunkdClient {
  /// Underlying HTTP client (carries the timeout).
  http: Client,
  /// Full health URL including `output_mode=json`.
  url: String,
  /// Basic auth username.
  username: String,
  /// Basic auth password.
  password: String,
}

impl SplunkdClient {
  /// Create a client from the splunkd section of the config.
  pub fn new(config: &SplunkdConfig) -> Result<Self> {
    Self::with_url(
      config.health_url(),
      config.username.clone(),
      config.password.clone(),
      config.timeout(),
    )
  }

  /// Create a client against an explicit URL.
  pub fn with_url(
    url: impl Into<String>,
    username: impl Into<String>,
    password: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let http = Client::builder()
      .timeout(timeout)
      .no_proxy()
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build splunkd HTTP client")?;

    Ok(Self {
      http,
      url: url.into(),
      username: username.into(),
      password: password.into(),
    })
  }

  /// Health endpoint URL.
  pub fn url(&self) -> &str {
    &self.url
  }
}

#[async_trait]
impl HealthSource for SplunkdClient {
  async fn fetch(&self) -> Result<HealthDocument, HealthError> {
    let response = self
      .http
      .get(&self.url)
      .basic_auth(&self.username, Some(&self.password))
      .send()
      .await
      .map_err(|e| HealthError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      return Err(HealthError::Status(status.as_u16()));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| HealthError::Request(e.to_string()))?;
    debug!(bytes = body.len(), "Health document received");

    serde_json::from_slice(&body).map_err(|e| HealthError::Decode(e.to_string()))
  }
}
