//! Health Tree — splunkd Health Document Model
//!
//! Recursive status document returned by splunkd's health endpoint.
//! Each node carries its own status plus named sub-features; the tree
//! is flattened into a path-keyed map for metrics and verbose readiness output.
//!
//! Wire shape of a node:
//! `{ "health": "green", "reasons": { "red": { "1": { "indicator": .., "reason": .. } } }, "features": { .. } }`

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// The only `health` value that counts as healthy.
pub const HEALTHY_COLOR: &str = "green";

/// Path separator used when joining sanitized feature names.
pub const PATH_SEPARATOR: char = '/';

/// Flattened health tree: sanitized slash-joined path -> status.
///
/// Ordered so that verbose readiness output is stable across calls.
pub type FlattenedHealth = BTreeMap<String, HealthStatus>;

/// Primary reason attached to a non-green status.
///
/// Either field may be missing on the wire; it decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthReason {
    /// Indicator that tripped (e.g. `disk_space_remaining_mb`).
    pub indicator: String,
    /// Human-readable explanation.
    #[serde(rename = "reason")]
    pub text: String,
}

/// Status of a single node in the health tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Colour reported by splunkd (`green`, `yellow`, `red`). Empty when absent.
    pub health: String,
    /// First reported reason, if any.
    pub reason: Option<HealthReason>,
}

impl HealthStatus {
    /// Build a status with the given colour and no reason.
    pub fn new(health: impl Into<String>) -> Self {
        Self {
            health: health.into(),
            reason: None,
        }
    }

    /// Healthy iff the colour is exactly `"green"` (case-sensitive).
    pub fn is_healthy(&self) -> bool {
        self.health == HEALTHY_COLOR
    }
}

/// One node of the health tree.
///
/// Children keep document order; names are stored raw and only
/// sanitized when the tree is flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WireNode")]
pub struct HealthNode {
    /// This node's own status.
    pub status: HealthStatus,
    /// Named sub-features in document order.
    pub children: Vec<(String, HealthNode)>,
}

impl HealthNode {
    /// Leaf node with the given colour.
    pub fn new(health: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::new(health),
            children: Vec::new(),
        }
    }

    /// Append a named child (builder style).
    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: Self) -> Self {
        self.children.push((name.into(), child));
        self
    }

    /// Attach a reason to this node's status (builder style).
    #[must_use]
    pub fn with_reason(mut self, indicator: impl Into<String>, text: impl Into<String>) -> Self {
        self.status.reason = Some(HealthReason {
            indicator: indicator.into(),
            text: text.into(),
        });
        self
    }

    /// Whether this node's own status is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Flatten every descendant into a path-keyed map.
    ///
    /// The root's own status is not included. Internal nodes are recorded
    /// alongside their children. Siblings whose names sanitize to the same
    /// segment collide; the one appearing later in the document wins.
    pub fn flatten(&self) -> FlattenedHealth {
        let mut out = FlattenedHealth::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut FlattenedHealth) {
        for (name, child) in &self.children {
            let segment = sanitize(name);
            let path = if prefix.is_empty() {
                segment
            } else {
                format!("{prefix}{PATH_SEPARATOR}{segment}")
            };
            out.insert(path.clone(), child.status.clone());
            child.flatten_into(&path, out);
        }
    }

    /// Total number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|(_, child)| 1 + child.descendant_count())
            .sum()
    }
}

/// Strip spaces and hyphens from a feature name: `"S2S Port"` -> `"S2SPort"`.
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

// ── Wire representation ─────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireNode {
    #[serde(default)]
    health: Option<String>,
    #[serde(default)]
    reasons: Option<WireReasons>,
    #[serde(default, deserialize_with = "ordered_features")]
    features: Vec<(String, HealthNode)>,
}

/// splunkd nests reasons under the colour (`reasons.red."1"`); older
/// builds put the slot directly under `reasons`. Both are accepted.
#[derive(Debug, Default, Deserialize)]
struct WireReasons {
    #[serde(rename = "1")]
    primary: Option<HealthReason>,
    red: Option<WireReasonSlot>,
    yellow: Option<WireReasonSlot>,
}

#[derive(Debug, Default, Deserialize)]
struct WireReasonSlot {
    #[serde(rename = "1")]
    primary: Option<HealthReason>,
}

impl WireReasons {
    fn into_primary(self) -> Option<HealthReason> {
        self.primary
            .or_else(|| self.red.and_then(|slot| slot.primary))
            .or_else(|| self.yellow.and_then(|slot| slot.primary))
    }
}

impl From<WireNode> for HealthNode {
    fn from(wire: WireNode) -> Self {
        Self {
            status: HealthStatus {
                health: wire.health.unwrap_or_default(),
                reason: wire.reasons.and_then(WireReasons::into_primary),
            },
            children: wire.features,
        }
    }
}

/// Deserialize a JSON object into `(key, node)` pairs, keeping document order.
fn ordered_features<'de, D>(deserializer: D) -> Result<Vec<(String, HealthNode)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FeaturesVisitor;

    impl<'de> Visitor<'de> for FeaturesVisitor {
        type Value = Vec<(String, HealthNode)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of feature name to health node, or null")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut features = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, node)) = map.next_entry::<String, HealthNode>()? {
                features.push((name, node));
            }
            Ok(features)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(FeaturesVisitor)
}
