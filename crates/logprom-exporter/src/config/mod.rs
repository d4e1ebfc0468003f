//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use logprom_core::error::{LogPromError, Result};

pub use schema::{ErrorHandlingConfig, ExporterConfig, ExporterSection, MetricSection};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LogPromError::BadConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| LogPromError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
