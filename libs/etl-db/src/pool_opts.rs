//! Pool options application.

use crate::config::PoolCfg;
use sea_orm::ConnectOptions;

/// Apply the configured pool knobs to a connection builder.
pub trait ApplyPoolOpts {
    #[must_use]
    fn apply(self, cfg: &PoolCfg) -> Self;
}

impl ApplyPoolOpts for ConnectOptions {
    fn apply(mut self, cfg: &PoolCfg) -> Self {
        if let Some(n) = cfg.max_conns {
            self.max_connections(n);
        }
        if let Some(n) = cfg.min_conns {
            self.min_connections(n);
        }
        if let Some(t) = cfg.acquire_timeout {
            self.acquire_timeout(t);
        }
        if let Some(t) = cfg.idle_timeout {
            self.idle_timeout(t);
        }
        self.sqlx_logging(cfg.sqlx_logging);
        self
    }
}
