use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; override via the environment or the
/// command-line flags handled in `main`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// `SQLite` connection string (default: `sqlite://tracker.sqlite3`).
    pub database_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for a storage connection or lock (default: `5`).
    pub storage_timeout_secs: u64,
    /// Optional JSON syllabus replacing the built-in catalog.
    pub syllabus_path: Option<PathBuf>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {raw:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        raw: String,
    },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            database_url: "sqlite://tracker.sqlite3".into(),
            request_timeout_secs: 30,
            storage_timeout_secs: 5,
            syllabus_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `DATABASE_URL`         | `sqlite://tracker.sqlite3` |
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORAGE_TIMEOUT_SECS` | `5`                        |
    /// | `SYLLABUS_PATH`        | built-in catalog           |
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = match lookup("DATABASE_URL") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    var: "DATABASE_URL",
                });
            }
            Some(raw) => raw,
            None => defaults.database_url,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", "port number", defaults.port)?,
            database_url,
            request_timeout_secs: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                "number of seconds",
                defaults.request_timeout_secs,
            )?,
            storage_timeout_secs: parse_var(
                &lookup,
                "STORAGE_TIMEOUT_SECS",
                "number of seconds",
                defaults.storage_timeout_secs,
            )?,
            syllabus_path: lookup("SYLLABUS_PATH")
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_url, "sqlite://tracker.sqlite3");
        assert_eq!(config.storage_timeout(), Duration::from_secs(5));
        assert!(config.syllabus_path.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("STORAGE_TIMEOUT_SECS", "2"),
            ("SYLLABUS_PATH", "syllabi.json"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_timeout_secs, 2);
        assert_eq!(config.syllabus_path, Some(PathBuf::from("syllabi.json")));
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn blank_database_url_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", " ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: "DATABASE_URL" });
    }
}
