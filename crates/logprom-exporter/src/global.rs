//! Optional process-wide hook.
//!
//! Nothing here is installed implicitly: call `init` (or `init_default`)
//! once at startup and compose `layer()` into the subscriber yourself.
//! `teardown` removes the instance again, mostly for tests.

use std::sync::{Arc, PoisonError, RwLock};

use axum::routing::MethodRouter;

use logprom_core::error::{LogPromError, Result};
use logprom_core::labels::StaticLabels;

use crate::hook::Hook;
use crate::http::{ErrorHandling, HandlerOpts, TracingErrorLog};
use crate::layer::PrometheusLayer;
use crate::metrics::{CounterVec, Registry};

/// Metric name used by `init_default`.
pub const DEFAULT_METRIC_NAME: &str = "log_messages";

static GLOBAL: RwLock<Option<Arc<Hook>>> = RwLock::new(None);

/// Install `hook` as the process instance.
pub fn init(hook: Hook) -> Result<Arc<Hook>> {
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(LogPromError::AlreadyInitialized);
    }
    let hook = Arc::new(hook);
    *slot = Some(Arc::clone(&hook));
    Ok(hook)
}

/// Install a `log_messages` hook that keeps serving on render errors and
/// reports them through `tracing`.
pub fn init_default() -> Result<Arc<Hook>> {
    let opts = HandlerOpts::new(ErrorHandling::ContinueOnError)
        .with_error_log(Arc::new(TracingErrorLog));
    init(Hook::builder(DEFAULT_METRIC_NAME).handler_opts(opts).build()?)
}

pub fn hook() -> Option<Arc<Hook>> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Remove and return the process instance.
pub fn teardown() -> Option<Arc<Hook>> {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner).take()
}

fn installed() -> Result<Arc<Hook>> {
    hook().ok_or(LogPromError::NotInitialized)
}

pub fn handler<S>() -> Result<MethodRouter<S>>
where
    S: Clone + Send + Sync + 'static,
{
    Ok(installed()?.handler())
}

pub fn registry() -> Result<Registry> {
    Ok(installed()?.registry().clone())
}

pub fn collector() -> Result<Arc<CounterVec>> {
    Ok(installed()?.collector())
}

pub fn layer() -> Result<PrometheusLayer> {
    Ok(installed()?.layer())
}

pub fn set_name(metric_name: &str) -> Result<()> {
    installed()?.set_name(metric_name)
}

pub fn set_labels(labels: StaticLabels) -> Result<()> {
    installed()?.set_labels(labels)
}
