//! Idempotent schema bootstrap applied at startup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::DbPool;

/// The create-if-not-exists bootstrap shipped with the crate. Safe to
/// re-run against an already initialized database.
pub static BOOTSTRAP_SQL: &str = include_str!("schema.sql");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("could not read schema script `{path}`: {source}")]
    ReadScript { path: PathBuf, source: std::io::Error },
    #[error("schema bootstrap failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Applies the embedded bootstrap script.
pub async fn ensure(pool: &DbPool) -> Result<(), SchemaError> {
    sqlx::raw_sql(BOOTSTRAP_SQL).execute(pool).await?;
    Ok(())
}

/// Applies an operator-supplied bootstrap script. A missing file is not
/// fatal: it is logged and the embedded script is applied instead.
pub async fn ensure_from_script(pool: &DbPool, path: &Path) -> Result<(), SchemaError> {
    match std::fs::read_to_string(path) {
        Ok(sql) => {
            sqlx::raw_sql(&sql).execute(pool).await?;
            info!(script = %path.display(), "applied schema bootstrap script");
            Ok(())
        }
        Err(source) if source.kind() == ErrorKind::NotFound => {
            warn!(
                script = %path.display(),
                "schema script not found; applying embedded bootstrap"
            );
            ensure(pool).await
        }
        Err(source) => Err(SchemaError::ReadScript { path: path.to_path_buf(), source }),
    }
}
