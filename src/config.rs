//! Connection bootstrap
//!
//! The DSN comes from, in order:
//! - `GS_TOUCHPOINT_DSN`
//! - the discrete `PG*` variables
//! - a `dsn` entry in the TOML config file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DSN_ENV: &str = "GS_TOUCHPOINT_DSN";
pub const DEFAULT_PORT: &str = "5432";
pub const DEFAULT_SSLMODE: &str = "require";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerConfig {
    pub dsn: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("ledger.toml")
}

/// Load the config file.
///
/// A missing default file is not an error; a missing explicit path is.
pub fn load_config(path: Option<&Path>) -> Result<Option<LedgerConfig>> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!("config file not found: {}", path.display())));
        }
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let config: LedgerConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Build a DSN from `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE`
/// and `PGSSLMODE`. Returns `None` unless host, user and database are set.
pub fn dsn_from_pg_vars<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).unwrap_or_default();

    let host = var("PGHOST");
    let user = var("PGUSER");
    let dbname = var("PGDATABASE");
    if host.is_empty() || user.is_empty() || dbname.is_empty() {
        return None;
    }

    let password = var("PGPASSWORD");
    let mut port = var("PGPORT");
    if port.is_empty() {
        port = DEFAULT_PORT.to_string();
    }
    let mut sslmode = var("PGSSLMODE");
    if sslmode.is_empty() {
        sslmode = DEFAULT_SSLMODE.to_string();
    }

    Some(format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        user, password, host, port, dbname, sslmode
    ))
}

/// Pick the DSN from an environment lookup and an optional config file.
pub fn resolve_dsn<F>(lookup: F, file: Option<&LedgerConfig>) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dsn) = lookup(DSN_ENV).map(|v| v.trim().to_string()) {
        if !dsn.is_empty() {
            tracing::debug!("using DSN from {}", DSN_ENV);
            return Ok(dsn);
        }
    }

    if let Some(dsn) = dsn_from_pg_vars(&lookup) {
        tracing::debug!("using DSN assembled from PG* variables");
        return Ok(dsn);
    }

    if let Some(dsn) = file.and_then(|c| c.dsn.as_deref()).map(str::trim) {
        if !dsn.is_empty() {
            tracing::debug!("using DSN from config file");
            return Ok(dsn.to_string());
        }
    }

    Err(Error::Config(format!(
        "missing {} or PG* environment variables",
        DSN_ENV
    )))
}

/// Resolve the DSN from the process environment and config file.
pub fn resolve_dsn_from_env(config_path: Option<&Path>) -> Result<String> {
    let file = load_config(config_path)?;
    resolve_dsn(|key| std::env::var(key).ok(), file.as_ref())
}
