use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;

use logprom_core::error::{LogPromError, Result};
use logprom_core::labels::{sanitize_name, TYPE_KEY};

use crate::hook::HookBuilder;
use crate::http::{ErrorHandling, HandlerOpts, TracingErrorLog};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    pub metric: MetricSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LogPromError::UnsupportedVersion);
        }
        self.exporter.validate()?;
        self.metric.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.path.starts_with('/') {
            return Err(LogPromError::BadConfig(
                "exporter.path must start with '/'".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            LogPromError::BadConfig(format!(
                "exporter.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:9100".into()
}
fn default_path() -> String {
    "/metrics".into()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlingConfig {
    #[default]
    Continue,
    Fail,
}

impl From<ErrorHandlingConfig> for ErrorHandling {
    fn from(c: ErrorHandlingConfig) -> Self {
        match c {
            ErrorHandlingConfig::Continue => ErrorHandling::ContinueOnError,
            ErrorHandlingConfig::Fail => ErrorHandling::HttpErrorOnError,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSection {
    pub name: String,

    #[serde(default = "default_type_key")]
    pub type_key: String,

    #[serde(default)]
    pub static_labels: BTreeMap<String, String>,

    #[serde(default = "default_preinit")]
    pub preinit: bool,

    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,
}

impl MetricSection {
    pub fn validate(&self) -> Result<()> {
        if sanitize_name(&self.name).is_empty() {
            return Err(LogPromError::BadConfig("metric.name must not be empty".into()));
        }
        if self.type_key.trim().is_empty() {
            return Err(LogPromError::BadConfig("metric.type_key must not be empty".into()));
        }
        Ok(())
    }

    /// Hook builder preloaded from this section. Render errors go to `tracing`.
    pub fn builder(&self) -> HookBuilder {
        let opts = HandlerOpts::new(self.error_handling.into())
            .with_error_log(Arc::new(TracingErrorLog));
        HookBuilder::new(self.name.clone())
            .handler_opts(opts)
            .type_key(self.type_key.clone())
            .static_labels(self.static_labels.clone())
            .preinit(self.preinit)
    }
}

fn default_type_key() -> String {
    TYPE_KEY.into()
}
fn default_preinit() -> bool {
    true
}
