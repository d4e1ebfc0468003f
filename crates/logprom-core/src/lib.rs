//! logprom core: log-event model, label schema and error types.
//!
//! This crate defines how a log event is classified into counter labels and
//! the error surface shared by the exporter and the facade. It carries no
//! runtime or HTTP dependencies so the schema logic can be reused on its own.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod labels;

/// Shared result type.
pub use error::{ErrorCode, LogPromError, Result};
pub use event::{FieldValue, LogEvent, Severity};
pub use labels::{sanitize_name, LabelSchema, StaticLabels, DEFAULT_TYPE, LEVEL_KEY, TYPE_KEY};
