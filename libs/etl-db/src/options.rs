//! DSN assembly, environment expansion and credential redaction.

use crate::config::DbConnConfig;
use crate::{DbEngine, DbError, Result};

const DEFAULT_PG_PORT: u16 = 5432;

/// Build the final DSN for `cfg`, expanding `${VAR}` references.
///
/// # Errors
/// Returns `DbError::InvalidParameter` when neither a DSN nor a host is configured,
/// and `DbError::EnvVar` when a referenced environment variable is not set.
pub fn build_dsn(cfg: &DbConnConfig) -> Result<String> {
    if let Some(dsn) = cfg.dsn.as_deref() {
        if cfg.host.is_some() || cfg.dbname.is_some() {
            return Err(DbError::ConfigConflict(
                "'dsn' cannot be combined with 'host' or 'dbname'".to_owned(),
            ));
        }
        return expand_env_vars(dsn);
    }

    let host = cfg.host.as_deref().ok_or_else(|| {
        DbError::InvalidParameter("either 'dsn' or 'host' must be provided".to_owned())
    })?;

    let mut url = url::Url::parse("postgres://localhost")?;
    url.set_host(Some(host))?;
    url.set_port(Some(cfg.port.unwrap_or(DEFAULT_PG_PORT)))
        .map_err(|()| DbError::InvalidParameter(format!("invalid port for host '{host}'")))?;
    if let Some(user) = cfg.user.as_deref() {
        url.set_username(user)
            .map_err(|()| DbError::InvalidParameter(format!("invalid user '{user}'")))?;
    }
    if let Some(password) = cfg.password.as_deref() {
        let password = resolve_password(password)?;
        url.set_password(Some(&password))
            .map_err(|()| DbError::InvalidParameter("invalid password".to_owned()))?;
    }
    if let Some(dbname) = cfg.dbname.as_deref() {
        url.set_path(dbname);
    }
    Ok(url.to_string())
}

/// Infer the engine from the DSN scheme.
///
/// # Errors
/// Returns `DbError::UnknownDsn` for schemes other than Postgres and `SQLite`.
pub fn engine_from_dsn(dsn: &str) -> Result<DbEngine> {
    let scheme = dsn.split(':').next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => Ok(DbEngine::Postgres),
        "sqlite" => Ok(DbEngine::Sqlite),
        _ => Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn)))),
    }
}

/// True for `SQLite` DSNs that open a private in-memory database per connection.
#[must_use]
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.starts_with("sqlite::memory:") || dsn.contains("mode=memory")
}

/// Expand `${VAR}` references from the process environment.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| DbError::InvalidParameter(e.to_string()))?;
    let mut result = input.to_owned();

    for caps in re.captures_iter(input) {
        let value = std::env::var(&caps[1])?;
        result = result.replace(&caps[0], &value);
    }

    Ok(result)
}

fn resolve_password(password: &str) -> Result<String> {
    match password
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var_name) => Ok(std::env::var(var_name)?),
        None => Ok(password.to_owned()),
    }
}

/// Mask the password of a DSN so it can be logged.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            } else {
                "***".to_owned()
            }
        }
        Some(dsn) => dsn.to_owned(),
        None => "none".to_owned(),
    }
}
