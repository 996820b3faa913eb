mod bootstrap;
mod health;
mod service;

use anyhow::Result;
use presence_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use presence_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
    )
    .await?;

    tracing::info!(event_name = "system.server.started", "presence-server started");

    tokio::select! {
        result = app.runner.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(event_name = "system.server.stopping", "shutdown signal received");
        }
    }

    Ok(())
}
