//! logprom exporter
//!
//! - Loads `logprom.yaml` (or `$LOGPROM_CONFIG`)
//! - Counts every `tracing` event of this process into the log counter
//! - Serves the counter at `exporter.path` plus `/healthz`

use std::error::Error;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use logprom_exporter::{config, global, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::var("LOGPROM_CONFIG").unwrap_or_else(|_| "logprom.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.exporter.listen_addr()?;

    let hook = global::init(cfg.metric.builder().build()?)?;

    // EnvFilter only gates console output; the counter sees every level.
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(EnvFilter::from_default_env()))
        .with(hook.layer())
        .init();

    let app = router::build_router(&hook, &cfg.exporter.path);

    tracing::info!(%listen, metric = %hook.metric_name(), "logprom-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
