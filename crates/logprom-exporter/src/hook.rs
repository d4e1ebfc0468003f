//! Counter hook: turns observed log events into counter increments.
//!
//! The hook owns one live counter vector, registered in a `Registry`. The
//! vector and the static label values matching its schema are bundled in an
//! `ActiveCounter` behind `RwLock<Arc<_>>`:
//! - `record` clones the `Arc` under a read guard and increments after the
//!   guard is dropped, so the hot path never waits on a rebuild beyond the
//!   pointer read.
//! - `set_name` / `set_labels` build a complete replacement first, then swap
//!   registry entry and pointer together under the write guard. A failed
//!   rebuild leaves the previous counter live and registered.
//!
//! Never log while holding `active`: the hook may itself be subscribed to
//! the events it would emit.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use axum::routing::MethodRouter;

use logprom_core::error::{LogPromError, Result};
use logprom_core::event::{LogEvent, Severity};
use logprom_core::labels::{sanitize_name, static_values, LabelSchema, StaticLabels, TYPE_KEY};

use crate::http::{self, HandlerOpts};
use crate::layer::PrometheusLayer;
use crate::metrics::{Collector, CounterVec, Registry};

/// Builder for [`Hook`]. Setters apply in call order; later calls win.
pub struct HookBuilder {
    metric_name: String,
    handler_opts: HandlerOpts,
    static_labels: StaticLabels,
    type_key: String,
    registry: Option<Registry>,
    preinit: bool,
}

impl HookBuilder {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            handler_opts: HandlerOpts::default(),
            static_labels: StaticLabels::new(),
            type_key: TYPE_KEY.to_string(),
            registry: None,
            preinit: true,
        }
    }

    /// Scrape error policy and error sink.
    pub fn handler_opts(mut self, opts: HandlerOpts) -> Self {
        self.handler_opts = opts;
        self
    }

    /// Labels attached to every increment.
    pub fn static_labels(mut self, labels: StaticLabels) -> Self {
        self.static_labels = labels;
        self
    }

    /// Metadata key read for the event type (`type` by default).
    pub fn type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    /// Register into an existing registry instead of a fresh one.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Emit zero rows for every severity up front (default: on).
    pub fn preinit(mut self, on: bool) -> Self {
        self.preinit = on;
        self
    }

    pub fn build(self) -> Result<Hook> {
        let registry = self.registry.unwrap_or_default();
        let active = build_active(
            &self.metric_name,
            &self.type_key,
            self.static_labels,
            self.preinit,
            &[],
        )?;
        registry.register(active.vec.clone())?;

        tracing::debug!(
            metric = %active.vec_name(),
            labels = ?active.vec.schema().keys(),
            "log counter registered"
        );

        Ok(Hook {
            active: RwLock::new(Arc::new(active)),
            rebuild: Mutex::new(()),
            registry,
            handler_opts: self.handler_opts,
            type_key: self.type_key,
            preinit: self.preinit,
        })
    }
}

/// Live counter plus everything needed to derive its label values.
struct ActiveCounter {
    /// Name as given by the caller, before sanitization.
    raw_name: String,
    vec: Arc<CounterVec>,
    static_labels: StaticLabels,
}

impl ActiveCounter {
    fn vec_name(&self) -> &str {
        self.vec.name()
    }

    /// Zero rows for `(level, type)` pairs seen on a previous vector.
    fn carry(&self, pairs: &[(String, String)]) {
        let statics = static_values(&self.static_labels);
        for (level, ty) in pairs {
            let mut values = Vec::with_capacity(self.vec.schema().len());
            values.push(level.clone());
            values.push(ty.clone());
            values.extend(statics.iter().cloned());
            self.vec.add_row(&values, 0);
        }
    }
}

fn build_active(
    raw_name: &str,
    type_key: &str,
    static_labels: StaticLabels,
    preinit: bool,
    carried: &[(String, String)],
) -> Result<ActiveCounter> {
    let name = sanitize_name(raw_name);
    if name.is_empty() {
        return Err(LogPromError::InvalidName(raw_name.to_string()));
    }
    let schema = LabelSchema::new(type_key, &static_labels)?;
    let help = format!("Total number of {}.", raw_name.trim());
    let vec = CounterVec::new(name, help, schema)?;

    if preinit {
        for sev in Severity::ALL {
            vec.touch(&vec.schema().values(sev, None, &static_labels))?;
        }
    }
    let active = ActiveCounter {
        raw_name: raw_name.to_string(),
        vec: Arc::new(vec),
        static_labels,
    };
    active.carry(carried);
    Ok(active)
}

/// Log-event counter hook.
pub struct Hook {
    active: RwLock<Arc<ActiveCounter>>,
    rebuild: Mutex<()>,
    registry: Registry,
    handler_opts: HandlerOpts,
    type_key: String,
    preinit: bool,
}

impl Hook {
    pub fn builder(metric_name: impl Into<String>) -> HookBuilder {
        HookBuilder::new(metric_name)
    }

    /// Hook with default options and no static labels.
    pub fn new(metric_name: impl Into<String>) -> Result<Self> {
        HookBuilder::new(metric_name).build()
    }

    /// Count one event.
    pub fn observe(&self, event: &LogEvent) {
        let event_type = event.field_string(&self.type_key);
        self.record(event.severity, event_type.as_deref());
    }

    /// Count one event given its severity and raw (unsanitized) type.
    pub fn record(&self, severity: Severity, event_type: Option<&str>) {
        let active = self.current();
        let values = active
            .vec
            .schema()
            .values(severity, event_type, &active.static_labels);
        active.vec.add_row(&values, 1);
    }

    /// Severities this hook observes: all of them.
    pub fn levels(&self) -> &'static [Severity] {
        &Severity::ALL
    }

    /// Re-register the counter under a new name, keeping the label schema.
    pub fn set_name(&self, metric_name: &str) -> Result<()> {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        let cur = self.current();
        self.rebuild_with(&cur, metric_name, cur.static_labels.clone())
    }

    /// Re-register the counter with a new set of static labels.
    pub fn set_labels(&self, labels: StaticLabels) -> Result<()> {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        let cur = self.current();
        self.rebuild_with(&cur, &cur.raw_name, labels)
    }

    fn rebuild_with(&self, cur: &ActiveCounter, raw_name: &str, labels: StaticLabels) -> Result<()> {
        let old_name = cur.vec_name().to_string();
        let res = self.swap(cur, raw_name, labels);
        match &res {
            Ok(new_name) => tracing::info!(old = %old_name, new = %new_name, "log counter rebuilt"),
            Err(e) => tracing::warn!(metric = %old_name, error = %e, "log counter rebuild failed; keeping previous"),
        }
        res.map(|_| ())
    }

    fn swap(&self, cur: &ActiveCounter, raw_name: &str, labels: StaticLabels) -> Result<String> {
        let next = build_active(
            raw_name,
            &self.type_key,
            labels,
            self.preinit,
            &observed_pairs(&cur.vec),
        )?;
        let new_name = next.vec_name().to_string();

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        self.registry.replace(cur.vec_name(), next.vec.clone())?;
        // Pairs first seen on `cur` after the snapshot above.
        next.carry(&observed_pairs(&cur.vec));
        *active = Arc::new(next);
        Ok(new_name)
    }

    /// Render handler for the registry; mount it wherever the caller likes.
    pub fn handler<S>(&self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        http::handler(self.registry.clone(), self.handler_opts.clone())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The live counter vector.
    pub fn collector(&self) -> Arc<CounterVec> {
        self.current().vec.clone()
    }

    /// `tracing` layer feeding this hook.
    pub fn layer(self: &Arc<Self>) -> PrometheusLayer {
        PrometheusLayer::new(Arc::clone(self))
    }

    /// Sanitized name of the live counter.
    pub fn metric_name(&self) -> String {
        self.current().vec_name().to_string()
    }

    pub fn static_labels(&self) -> StaticLabels {
        self.current().static_labels.clone()
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    fn current(&self) -> Arc<ActiveCounter> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Distinct `(level, type)` pairs with a row in `vec`.
fn observed_pairs(vec: &CounterVec) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = vec
        .label_sets()
        .into_iter()
        .filter_map(|mut v| {
            if v.len() < 2 {
                return None;
            }
            v.truncate(2);
            let ty = v.pop()?;
            let level = v.pop()?;
            Some((level, ty))
        })
        .collect();
    pairs.dedup();
    pairs
}
