//! Counter vectors and the registry that renders them.
//!
//! Rows of a `CounterVec` live in a `DashMap` keyed by the label values in
//! schema order, each holding an `AtomicU64`. Increments on an existing row
//! take a shard read lock and one `fetch_add`; only the first increment of a
//! new label combination allocates.
//!
//! The registry maps metric names to collectors; `http::render` encodes a
//! sorted snapshot in Prometheus text exposition format (0.0.4).

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use logprom_core::error::{LogPromError, Result};
use logprom_core::labels::LabelSchema;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Anything the registry can render.
pub trait Collector: Send + Sync {
    /// Metric family name; unique within a registry.
    fn name(&self) -> &str;

    /// Append this family in text exposition format.
    fn encode(&self, out: &mut String) -> Result<()>;
}

/// Named counter with a fixed label schema.
pub struct CounterVec {
    name: String,
    help: String,
    schema: LabelSchema,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, schema: LabelSchema) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(LogPromError::InvalidName(name));
        }
        Ok(Self {
            name,
            help: help.into(),
            schema,
            map: DashMap::new(),
        })
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[String]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[String], v: u64) -> Result<()> {
        self.check_arity(values)?;
        self.add_row(values, v);
        Ok(())
    }

    /// Increment a row whose values were derived from `self.schema()`.
    pub(crate) fn add_row(&self, values: &[String], v: u64) {
        if let Some(counter) = self.map.get(values) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self
            .map
            .entry(values.to_vec())
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Create a zero row for `values` if absent.
    pub fn touch(&self, values: &[String]) -> Result<()> {
        self.check_arity(values)?;
        if !self.map.contains_key(values) {
            self.map
                .entry(values.to_vec())
                .or_insert_with(|| AtomicU64::new(0));
        }
        Ok(())
    }

    /// Current value of one row.
    pub fn get<S: AsRef<str>>(&self, values: &[S]) -> Option<u64> {
        let key: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.map.get(&key).map(|c| c.load(Ordering::Relaxed))
    }

    /// Every label combination with a row, in sorted order.
    pub fn label_sets(&self) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        out.sort();
        out
    }

    fn check_arity(&self, values: &[String]) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(LogPromError::InvalidLabels(format!(
                "{}: expected {} label values, got {}",
                self.name,
                self.schema.len(),
                values.len()
            )));
        }
        Ok(())
    }
}

impl Collector for CounterVec {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, out: &mut String) -> Result<()> {
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();

        let render = |out: &mut String| -> std::fmt::Result {
            writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help))?;
            writeln!(out, "# TYPE {} counter", self.name)?;
            for (values, val) in &rows {
                let label_str = self
                    .schema
                    .keys()
                    .iter()
                    .zip(values)
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(out, "{}{{{}}} {}", self.name, label_str, val)?;
            }
            Ok(())
        };
        render(out).map_err(|e| LogPromError::Render(format!("{}: {e}", self.name)))
    }
}

/// Name-indexed set of collectors. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct Registry {
    collectors: Arc<RwLock<BTreeMap<String, Arc<dyn Collector>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector. Fails if its name is taken.
    pub fn register(&self, c: Arc<dyn Collector>) -> Result<()> {
        let mut map = self.collectors.write().unwrap_or_else(PoisonError::into_inner);
        let name = c.name().to_string();
        if map.contains_key(&name) {
            return Err(LogPromError::AlreadyRegistered(name));
        }
        map.insert(name, c);
        Ok(())
    }

    /// Remove a collector by name. Returns whether it was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.collectors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Swap the collector registered as `old` for `new` in one step.
    ///
    /// Fails, leaving the registry untouched, if `new`'s name belongs to a
    /// collector other than `old`.
    pub fn replace(&self, old: &str, new: Arc<dyn Collector>) -> Result<()> {
        let mut map = self.collectors.write().unwrap_or_else(PoisonError::into_inner);
        let name = new.name().to_string();
        if name != old && map.contains_key(&name) {
            return Err(LogPromError::AlreadyRegistered(name));
        }
        map.remove(old);
        map.insert(name, new);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.collectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of the registered collectors, sorted by name. Rendering works
    /// on the snapshot so the lock is never held while encoding.
    pub fn gather(&self) -> Vec<Arc<dyn Collector>> {
        self.collectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
