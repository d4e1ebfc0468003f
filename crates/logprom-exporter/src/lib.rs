//! logprom exporter library entry.
//!
//! Wires the counter hook, its `tracing` layer, the metrics registry and the
//! scrape handler together. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod config;
pub mod global;
pub mod hook;
pub mod http;
pub mod layer;
pub mod metrics;
pub mod router;

pub use hook::{Hook, HookBuilder};
pub use http::{ErrorHandling, ErrorLog, HandlerOpts, TracingErrorLog};
pub use layer::PrometheusLayer;
pub use metrics::{Collector, CounterVec, Registry};
