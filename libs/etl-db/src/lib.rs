//! Database plumbing for the Workery ETL.
//!
//! Provides typed connection configuration with pool knobs, a connect helper
//! that never logs credentials, and the [`scoped`] query layer that makes
//! cross-tenant reads and writes unrepresentable: a statement against a
//! tenant-owned table cannot be executed until it has been bound to a
//! [`scoped::TenantScope`].
//!
//! # Features
//! - `pg`, `sqlite`: enable the matching `SeaORM` driver (both on by default)

pub mod config;
pub mod options;
pub mod scoped;

mod pool_opts;

pub use config::{DbConnConfig, PoolCfg};
pub use options::{build_dsn, engine_from_dsn, is_memory_dsn, redact_credentials_in_dsn};

use pool_opts::ApplyPoolOpts;
use sea_orm::{ConnectOptions, DatabaseConnection};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for connection setup.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Open a pooled connection described by `cfg`.
///
/// In-memory `SQLite` databases are private to one connection, so their pool is
/// pinned to a single connection unless configured otherwise.
///
/// # Errors
/// Returns an error if the configuration is invalid, the driver for the DSN
/// is not compiled in, or the database cannot be reached.
pub async fn connect(cfg: &DbConnConfig) -> Result<DatabaseConnection> {
    let dsn = build_dsn(cfg)?;
    let engine = engine_from_dsn(&dsn)?;
    match engine {
        DbEngine::Postgres if !cfg!(feature = "pg") => return Err(DbError::FeatureDisabled("pg")),
        DbEngine::Sqlite if !cfg!(feature = "sqlite") => {
            return Err(DbError::FeatureDisabled("sqlite"));
        }
        _ => {}
    }

    let mut pool = cfg.pool.clone().unwrap_or_default();
    if engine == DbEngine::Sqlite && is_memory_dsn(&dsn) && pool.max_conns.is_none() {
        pool.max_conns = Some(1);
    }

    let mut opts = ConnectOptions::new(dsn.clone()).apply(&pool);
    if let Some(schema) = cfg.schema.as_deref() {
        if engine != DbEngine::Postgres {
            return Err(DbError::ConfigConflict(
                "'schema' is only supported for Postgres".to_owned(),
            ));
        }
        opts.set_schema_search_path(schema.to_owned());
    }

    tracing::debug!(
        dsn = %redact_credentials_in_dsn(Some(&dsn)),
        engine = ?engine,
        "Connecting to database"
    );

    Ok(sea_orm::Database::connect(opts).await?)
}
