//! Operational HTTP endpoints.
//!
//! - metrics handler : Prometheus text format, mounted by the caller
//! - `/healthz`      : liveness (binary only)
//! - `/readyz`       : readiness (binary only)
//!
//! Each collector is rendered into its own buffer so that a failing one can
//! be dropped from the response without corrupting the others.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
};

use logprom_core::error::{LogPromError, Result};

use crate::metrics::Registry;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// What to do when a collector fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Log the error and serve whatever rendered.
    ContinueOnError,
    /// Log the error and answer 500.
    #[default]
    HttpErrorOnError,
}

/// Sink for render errors.
pub trait ErrorLog: Send + Sync {
    fn log(&self, msg: &str);
}

/// Forwards render errors to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn log(&self, msg: &str) {
        tracing::error!(target: "logprom::http", error = %msg, "metrics render failed");
    }
}

#[derive(Clone, Default)]
pub struct HandlerOpts {
    pub error_handling: ErrorHandling,
    pub error_log: Option<Arc<dyn ErrorLog>>,
}

impl HandlerOpts {
    pub fn new(error_handling: ErrorHandling) -> Self {
        Self {
            error_handling,
            error_log: None,
        }
    }

    pub fn with_error_log(mut self, log: Arc<dyn ErrorLog>) -> Self {
        self.error_log = Some(log);
        self
    }

    fn log(&self, err: &LogPromError) {
        if let Some(l) = &self.error_log {
            l.log(&err.to_string());
        }
    }
}

/// Render `registry` under the error policy in `opts`.
///
/// With `ContinueOnError` this never fails; failing collectors are left out.
pub fn render(registry: &Registry, opts: &HandlerOpts) -> Result<String> {
    let mut out = String::new();
    for c in registry.gather() {
        let mut buf = String::new();
        match c.encode(&mut buf) {
            Ok(()) => out.push_str(&buf),
            Err(e) => {
                opts.log(&e);
                if opts.error_handling == ErrorHandling::HttpErrorOnError {
                    return Err(e);
                }
            }
        }
    }
    Ok(out)
}

/// One scrape as an HTTP response.
pub fn scrape(registry: &Registry, opts: &HandlerOpts) -> Response {
    match render(registry, opts) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("error gathering metrics: {e}\n"),
        )
            .into_response(),
    }
}

/// GET handler serving `registry`.
pub fn handler<S>(registry: Registry, opts: HandlerOpts) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move || {
        let registry = registry.clone();
        let opts = opts.clone();
        async move { scrape(&registry, &opts) }
    })
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, "ready")
}
