//! Layered configuration: defaults, then YAML, then `WORKERY_ETL__*`
//! environment variables, then command-line overrides.

use etl_db::DbConnConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use legacy_migration::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "WORKERY_ETL__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    Missing(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// Multi-tenant database the migration writes to.
    pub destination: DbConnConfig,
    /// Single-tenant database the migration reads from.
    pub legacy: DbConnConfig,
    /// Attachment directories; private files cannot be migrated without them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blobs: Option<BlobsConfig>,
    pub pipeline: PipelineSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobsConfig {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub cache_resolutions: bool,
    /// Print one line per migrated or skipped row.
    pub progress: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            cache_resolutions: true,
            progress: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins over it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl EtlConfig {
    /// Load the effective configuration.
    ///
    /// # Errors
    /// `ConfigError::Missing` for a nonexistent file, `ConfigError::Invalid`
    /// when a layer cannot be parsed or does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// `-v` sets the log level only when neither the file nor the
    /// environment did.
    pub fn apply_cli_overrides(&mut self, verbose: u8) {
        if self.logging.level.is_none() && verbose > 0 {
            let level = match verbose {
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            self.logging.level = Some(level.to_owned());
        }
    }

    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cache_resolutions: self.pipeline.cache_resolutions,
        }
    }

    /// Copy safe to print: passwords and DSN credentials masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            destination: self.destination.redacted(),
            legacy: self.legacy.redacted(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_a_file() {
        let cfg = EtlConfig::load(None).unwrap();
        assert!(cfg.pipeline.cache_resolutions);
        assert!(cfg.pipeline.progress);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.blobs.is_none());
    }

    #[test]
    fn yaml_layer_overrides_defaults() {
        let file = yaml(
            r#"
destination:
  dsn: "sqlite::memory:"
legacy:
  host: legacy-db
  user: workery
  password: ${LEGACY_PASSWORD}
  dbname: workery
  pool:
    max_conns: 4
    acquire_timeout: 5s
pipeline:
  cache_resolutions: false
logging:
  format: json
"#,
        );
        let cfg = EtlConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.destination.dsn.as_deref(), Some("sqlite::memory:"));
        assert_eq!(cfg.legacy.host.as_deref(), Some("legacy-db"));
        let pool = cfg.legacy.pool.as_ref().unwrap();
        assert_eq!(pool.acquire_timeout, Some(Duration::from_secs(5)));
        assert!(!cfg.pipeline_config().cache_resolutions);
        assert!(cfg.pipeline.progress);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = EtlConfig::load(Some(Path::new("/nonexistent/etl.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml("pipeline:\n  cache: true\n");
        let err = EtlConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn verbosity_only_fills_an_unset_level() {
        let mut cfg = EtlConfig::default();
        cfg.apply_cli_overrides(2);
        assert_eq!(cfg.logging.level.as_deref(), Some("debug"));

        cfg.apply_cli_overrides(3);
        assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn printed_config_hides_passwords() {
        let mut cfg = EtlConfig::default();
        cfg.legacy.password = Some("hunter2".to_owned());
        cfg.destination.dsn = Some("postgres://etl:secret@db/workery".to_owned());

        let printed = serde_json::to_string(&cfg.redacted()).unwrap();
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("secret"));
    }
}
