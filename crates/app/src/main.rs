//! Liftoff - runs the startup sequence, then keeps background jobs alive
//! until Ctrl-C.

use anyhow::Context;
use liftoff_domain::Config;
use liftoff_infra::config;
use liftoff_lib::utils::logging::init_tracing;
use liftoff_lib::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before config loading so `.env` can supply LIFTOFF_* variables
    let dotenv = dotenvy::dotenv();

    let (config, config_error) = match config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_tracing(&config.logging).context("failed to initialize logging")?;

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "dotenv.loaded"),
        Err(err) => tracing::debug!(error = %err, "dotenv.not_loaded"),
    }
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "config.using_defaults");
    }

    let context = AppContext::new(config).await.context("failed to build application context")?;
    context.start().await;

    tracing::info!("liftoff.ready");
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;

    tracing::info!("liftoff.stopping");
    context.shutdown().await.context("shutdown failed")?;
    Ok(())
}
