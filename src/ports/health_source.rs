//! Health Source Port - Upstream Health Document Interface
//!
//! Defines the trait for fetching one health document from the
//! monitored service. Every call is a fresh round trip; nothing is
//! cached at this boundary.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::health::HealthNode;

/// Envelope returned by the splunkd REST API.
///
/// `{ "entry": [ { "content": <HealthNode | null> }, ... ] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthDocument {
  /// Result entries; only the first one with content is used.
  #[serde(default)]
  pub entry: Vec<HealthEntry>,
}

/// A single entry of the REST envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthEntry {
  /// Health tree for this entry, if present.
  #[serde(default)]
  pub content: Option<HealthNode>,
}

impl HealthDocument {
  /// Document wrapping a single tree.
  pub fn from_root(root: HealthNode) -> Self {
    Self {
      entry: vec![HealthEntry {
        content: Some(root),
      }],
    }
  }

  /// First entry carrying a health tree.
  pub fn into_root(self) -> Option<HealthNode> {
    self.entry.into_iter().find_map(|e| e.content)
  }
}

/// Transient upstream failures. Never fatal; reported as unhealthy.
#[derive(Debug, Error)]
pub enum HealthError {
  /// Connection refused, reset, timed out, etc.
  #[error("health endpoint request failed: {0}")]
  Request(String),
  /// Endpoint answered with a non-success status.
  #[error("health endpoint returned HTTP {0}")]
  Status(u16),
  /// Body was not a valid health document.
  #[error("failed parsing health endpoint response: {0}")]
  Decode(String),
}

/// Trait for health document providers.
#[async_trait]
pub trait HealthSource: Send + Sync + 'static {
  /// Fetch and decode the current health document.
  async fn fetch(&self) -> Result<HealthDocument, HealthError>;
}
