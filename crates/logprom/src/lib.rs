//! Top-level facade crate for logprom.
//!
//! Re-exports core types and the exporter library so users can depend on a single crate.

pub mod core {
    pub use logprom_core::*;
}

pub mod exporter {
    pub use logprom_exporter::*;
}

pub use logprom_core::{LogEvent, Severity, StaticLabels};
pub use logprom_exporter::{Hook, HookBuilder, PrometheusLayer, Registry};
