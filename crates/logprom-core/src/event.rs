//! Log events as seen by the hook.
//!
//! `LogEvent` is the framework-neutral shape of one log call: a severity, an
//! open-ended bag of metadata and the message. The `tracing` layer in the
//! exporter never builds one (it reads the single field it needs straight
//! from the visitor), but callers wiring other log sources can.

use std::collections::BTreeMap;
use std::fmt;

/// Log severity, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Every severity, in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// Canonical label value.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

/// One metadata value. `Display` is the total stringification used when a
/// value ends up as a label.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    /// Pre-rendered `{:?}` text of a value with no better representation.
    Debug(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Debug(s) => f.write_str(s),
            FieldValue::I64(v) => write!(f, "{v}"),
            FieldValue::U64(v) => write!(f, "{v}"),
            FieldValue::F64(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::I64(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::U64(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::F64(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// A single log call.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub severity: Severity,
    pub metadata: BTreeMap<String, FieldValue>,
    pub message: String,
}

impl LogEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            metadata: BTreeMap::new(),
            message: message.into(),
        }
    }

    /// Attach one metadata entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Stringified metadata value under `key`, if present.
    pub fn field_string(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(ToString::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn severity_strings_are_lowercase() {
        let all: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(all, ["trace", "debug", "info", "warn", "error"]);
        assert_eq!(Severity::from(&tracing::Level::WARN), Severity::Warn);
    }

    #[test]
    fn non_string_fields_are_coerced() {
        let ev = LogEvent::new(Severity::Info, "x")
            .with("type", 42i64)
            .with("ok", true)
            .with("name", "plain");
        assert_eq!(ev.field_string("type").as_deref(), Some("42"));
        assert_eq!(ev.field_string("ok").as_deref(), Some("true"));
        assert_eq!(ev.field_string("name").as_deref(), Some("plain"));
        assert_eq!(ev.field_string("missing"), None);
    }
}
