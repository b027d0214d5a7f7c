//! Serde-facing connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for one database.
///
/// Either `dsn` or the discrete `host`/`port`/`user`/`password`/`dbname`
/// fields describe the server. Passwords of the form `${VAR}` and `${VAR}`
/// fragments inside the DSN are expanded from the environment at connect time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConnConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,
    /// Postgres search path applied to every pooled connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolCfg>,
}

/// Pool knobs; each one left unset keeps the driver default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolCfg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_conns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_conns: Option<u32>,
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub acquire_timeout: Option<Duration>,
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub idle_timeout: Option<Duration>,
    /// Let sqlx log every statement at debug level.
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl DbConnConfig {
    /// Shorthand for a DSN-only configuration.
    #[must_use]
    pub fn from_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }

    /// Copy of this configuration with the password masked, for printing.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            dsn: self
                .dsn
                .as_deref()
                .map(|dsn| crate::options::redact_credentials_in_dsn(Some(dsn))),
            password: self.password.as_ref().map(|_| "***".to_owned()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn pool_durations_use_humantime() {
        let cfg: PoolCfg = serde_json::from_value(serde_json::json!({
            "max_conns": 4,
            "acquire_timeout": "5s",
            "idle_timeout": "2m"
        }))
        .unwrap();
        assert_eq!(cfg.max_conns, Some(4));
        assert_eq!(cfg.acquire_timeout, Some(Duration::from_secs(5)));
        assert_eq!(cfg.idle_timeout, Some(Duration::from_secs(120)));
        assert!(!cfg.sqlx_logging);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<DbConnConfig>(serde_json::json!({
            "dsn": "sqlite::memory:",
            "hostname": "db"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn redacted_masks_password_and_dsn() {
        let cfg = DbConnConfig {
            dsn: Some("postgres://etl:secret@db:5432/workery".to_owned()),
            password: Some("secret".to_owned()),
            ..DbConnConfig::default()
        };
        let shown = cfg.redacted();
        assert_eq!(shown.password.as_deref(), Some("***"));
        assert!(!shown.dsn.unwrap().contains("secret"));
    }
}
