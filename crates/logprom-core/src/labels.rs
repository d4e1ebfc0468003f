//! Label schema derivation.
//!
//! A counter's label keys are always `level`, the event-type key, then the
//! static label keys in lexicographic order. Registration and lookup must
//! agree on that order, so it is derived in exactly one place.

use std::collections::{BTreeMap, HashSet};

use crate::error::{LogPromError, Result};
use crate::event::Severity;

/// First label key of every schema.
pub const LEVEL_KEY: &str = "level";
/// Default metadata key holding the event type.
pub const TYPE_KEY: &str = "type";
/// Event type used when the metadata has none.
pub const DEFAULT_TYPE: &str = "untyped";

/// Static labels attached to every increment. Ordered by key.
pub type StaticLabels = BTreeMap<String, String>;

/// Trim surrounding whitespace and replace inner spaces with `_`.
///
/// Applied to metric names and event types alike. Idempotent.
pub fn sanitize_name(s: &str) -> String {
    s.trim().replace(' ', "_")
}

/// Ordered label keys of one counter vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    keys: Vec<String>,
}

impl LabelSchema {
    /// Build `["level", type_key] + sorted(static keys)`.
    ///
    /// Fails on duplicate keys, e.g. a static label named `level`.
    pub fn new(type_key: &str, static_labels: &StaticLabels) -> Result<Self> {
        let mut keys = Vec::with_capacity(2 + static_labels.len());
        keys.push(LEVEL_KEY.to_string());
        keys.push(type_key.to_string());
        keys.extend(sorted_keys(static_labels).into_iter().map(str::to_string));

        let mut seen = HashSet::with_capacity(keys.len());
        for k in &keys {
            if k.is_empty() {
                return Err(LogPromError::InvalidLabels("empty label key".into()));
            }
            if !seen.insert(k.as_str()) {
                return Err(LogPromError::InvalidLabels(format!("duplicate label key: {k}")));
            }
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Metadata key read for the event type.
    pub fn type_key(&self) -> &str {
        &self.keys[1]
    }

    /// Label values for one event, in schema order.
    pub fn values(
        &self,
        severity: Severity,
        event_type: Option<&str>,
        static_labels: &StaticLabels,
    ) -> Vec<String> {
        let mut out = Vec::with_capacity(self.keys.len());
        out.push(severity.as_str().to_string());
        out.push(sanitize_name(event_type.unwrap_or(DEFAULT_TYPE)));
        out.extend(static_values(static_labels));
        out
    }
}

/// Static label keys in schema order.
pub fn sorted_keys(static_labels: &StaticLabels) -> Vec<&str> {
    let mut keys: Vec<&str> = static_labels.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// Static label values in schema order.
pub fn static_values(static_labels: &StaticLabels) -> Vec<String> {
    sorted_keys(static_labels)
        .into_iter()
        .filter_map(|k| static_labels.get(k).cloned())
        .collect()
}
