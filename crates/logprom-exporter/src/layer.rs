//! `tracing` integration.
//!
//! Every event reaching the subscriber is counted, whatever its level. Only
//! the hook's type field is read from the event; other fields and the
//! message are ignored.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing::subscriber::Interest;
use tracing_subscriber::layer::{Context, Layer};

use logprom_core::event::Severity;

use crate::hook::Hook;

/// Layer feeding events into a [`Hook`].
#[derive(Clone)]
pub struct PrometheusLayer {
    hook: Arc<Hook>,
}

impl PrometheusLayer {
    pub fn new(hook: Arc<Hook>) -> Self {
        Self { hook }
    }
}

impl<S: Subscriber> Layer<S> for PrometheusLayer {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::always()
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = TypeField {
            key: self.hook.type_key(),
            value: None,
        };
        event.record(&mut visitor);
        self.hook
            .record(Severity::from(event.metadata().level()), visitor.value.as_deref());
    }
}

/// Captures one field, stringified.
struct TypeField<'a> {
    key: &'a str,
    value: Option<String>,
}

impl TypeField<'_> {
    fn set(&mut self, field: &Field, value: impl fmt::Display) {
        if field.name() == self.key {
            self.value = Some(value.to_string());
        }
    }
}

impl Visit for TypeField<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.set(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.set(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.set(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.set(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == self.key {
            self.value = Some(format!("{value:?}"));
        }
    }
}
