//! Environment-backed configuration.
//!
//! Every variable beginning with `CMDHIST_` is captured into a [`Config`]
//! snapshot when the process starts. Lookups use the bare suffix, so
//! `CMDHIST_HISTORY_DB=/tmp/h.db` is read as `config.get_string("HISTORY_DB")`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The prefix shared by all recognized environment variables.
pub const ENV_PREFIX: &str = "CMDHIST_";

/// A snapshot of the `CMDHIST_*` environment taken at construction time.
#[derive(Debug, Clone, Default)]
pub struct Config {
    variables: HashMap<String, String>,
}

impl Config {
    /// Capture the current process environment.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build a config from explicit key/value pairs; only keys carrying the
    /// `CMDHIST_` prefix are kept.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let variables = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .map(|suffix| (suffix.to_string(), v))
            })
            .collect();
        Self { variables }
    }

    /// Returns true when the variable is present, even if empty.
    pub fn sets(&self, key: &str) -> bool {
        self.variables.contains_key(key.trim().to_uppercase().as_str())
    }

    /// Returns the string value for a config variable, if set.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.variables
            .get(key.trim().to_uppercase().as_str())
            .map(String::as_str)
    }

    /// Returns true when the variable is set to the literal string `true`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_string(key)
            .map(|v| v.trim() == "true")
            .unwrap_or(false)
    }

    /// Returns the integer value for a config variable, or `default` when
    /// unset or unparseable.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_string(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// Resolve the history database path from an explicit flag value, falling
/// back to the `CMDHIST_HISTORY_DB` variable.
pub fn database_path(flag: Option<&Path>, config: &Config) -> crate::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    match config.get_string("HISTORY_DB") {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(crate::Error::MissingDatabase),
    }
}

/// The user-level query definition file, `~/.cmdhist/queries`.
pub fn user_query_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cmdhist").join("queries"))
}

/// The system-wide query definition file, unless overridden by
/// `CMDHIST_SYSTEM_QUERY_FILE`.
pub fn system_query_file(config: &Config) -> PathBuf {
    config
        .get_string("SYSTEM_QUERY_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc/cmdhist/queries"))
}

pub fn ensure_db_dir(db_path: &Path) -> crate::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
