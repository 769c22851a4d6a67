use std::path::PathBuf;
use std::sync::Arc;

use fieldstat_engine::clock::SystemClock;
use fieldstat_engine::config::{self, EngineConfig};
use fieldstat_engine::shutdown::wait_for_shutdown;
use fieldstat_engine::Engine;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = match std::env::var("FIELDSTAT_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            tracing::info!(path = %path.display(), "loading configuration");
            config::load_from_file(&path)?
        }
        Err(_) => {
            tracing::info!("FIELDSTAT_CONFIG not set, using defaults");
            EngineConfig::default()
        }
    };

    let offset = config::zone_offset(&config).ok_or("zone.utc_offset_seconds out of range")?;
    let clock = Arc::new(SystemClock::with_offset(offset));
    let engine = Engine::start(&config, clock)?;
    tracing::info!(zone = %offset, "fieldstat engine ready");

    wait_for_shutdown().await;
    tracing::info!("shutdown signal received");

    let outcome = engine.shutdown(config.scheduler.shutdown_grace()).await;
    tracing::info!(?outcome, "fieldstat stopped");
    Ok(())
}
