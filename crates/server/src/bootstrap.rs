use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use presence_core::access::AdminPolicy;
use presence_core::config::{AppConfig, ConfigError, LoadOptions};
use presence_db::repositories::{SqlStatusRepository, SqlUserRepository};
use presence_db::schema::{self, SchemaError};
use presence_db::{connect_with_settings, DbPool};
use presence_telegram::client::BotApi;
use presence_telegram::commands::CommandRouter;
use presence_telegram::poller::{LongPollRunner, ReconnectPolicy};

use crate::service::GatewayAttendanceService;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runner: LongPollRunner<GatewayAttendanceService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] SchemaError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Builds the full runtime context. A failed database connection aborts the
/// bootstrap: the process must not start serving without a working pool.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    match &config.database.schema_script {
        Some(path) => schema::ensure_from_script(&db_pool, path).await,
        None => schema::ensure(&db_pool).await,
    }
    .map_err(BootstrapError::Schema)?;
    info!(event_name = "system.bootstrap.schema_applied", "schema bootstrap applied");

    let service = GatewayAttendanceService::new(
        Arc::new(SqlUserRepository::new(db_pool.clone())),
        Arc::new(SqlStatusRepository::new(db_pool.clone())),
    );
    let policy = AdminPolicy::new(config.telegram.admin_id, config.telegram.admin_handle.clone());
    let router = CommandRouter::new(service, policy);

    let bot = Arc::new(BotApi::new(
        config.telegram.bot_token.clone(),
        config.telegram.poll_timeout_secs,
    ));
    let runner = LongPollRunner::new(bot.clone(), bot, router, ReconnectPolicy::default());

    Ok(Application { config, db_pool, runner })
}
