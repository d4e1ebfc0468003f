//! Axum router wiring for the exporter binary.

use axum::{routing::get, Router};

use crate::{hook::Hook, http};

pub fn build_router(hook: &Hook, metrics_path: &str) -> Router {
    Router::new()
        .route(metrics_path, hook.handler())
        .route("/healthz", get(http::healthz))
        .route("/readyz", get(http::readyz))
}
