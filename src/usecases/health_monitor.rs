//! Health Monitor — Fetch, Flatten, Keep Last Good Snapshot
//!
//! Every `check()` is a fresh upstream round trip. A successful decode
//! replaces the stored snapshot; any failure leaves the previous
//! snapshot in place (stale but available) and reports unhealthy.
//!
//! Safe to call concurrently: overlapping checks each poll upstream and
//! the last writer's snapshot wins.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::domain::health::FlattenedHealth;
use crate::ports::health_source::HealthSource;

/// Owns the health source and the last flattened snapshot.
pub struct HealthMonitor {
    /// Upstream health document provider.
    source: Arc<dyn HealthSource>,
    /// Last successfully flattened tree.
    snapshot: RwLock<FlattenedHealth>,
}

impl HealthMonitor {
    /// Create a monitor with an empty snapshot.
    pub fn new(source: Arc<dyn HealthSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(FlattenedHealth::new()),
        }
    }

    /// Poll upstream once; returns whether the root status is healthy.
    #[instrument(skip(self))]
    pub async fn check(&self) -> bool {
        let document = match self.source.fetch().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                return false;
            }
        };

        let Some(root) = document.into_root() else {
            warn!("Health document has no entry with content");
            return false;
        };

        let flattened = root.flatten();
        debug!(
            health = %root.status.health,
            components = flattened.len(),
            "Health snapshot updated"
        );
        *self.snapshot.write().await = flattened;

        root.is_healthy()
    }

    /// Copy of the last successfully flattened tree.
    pub async fn snapshot(&self) -> FlattenedHealth {
        self.snapshot.read().await.clone()
    }
}

impl fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("HealthMonitor");
        match self.snapshot.try_read() {
            Ok(snapshot) => s.field("components", &snapshot.len()),
            Err(_) => s.field("components", &"<locked>"),
        };
        s.finish_non_exhaustive()
    }
}
