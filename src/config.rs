use std::fmt;

use chrono::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
/// actix-web cookie keys need at least 64 bytes.
pub const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug)]
pub enum ConfigError {
    Invalid { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, value } => write!(f, "Invalid value for {var}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// No URL means the in-memory demo directory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// `None` when unset or too short; a random key is generated then.
    pub session_key: Option<String>,
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            session_key: None,
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { var: "DATABASE_MAX_CONNECTIONS", value: v })?,
            None => defaults.max_connections,
        };

        let session_ttl = match lookup("SESSION_TTL_MINUTES") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Duration::minutes)
                .ok_or(ConfigError::Invalid { var: "SESSION_TTL_MINUTES", value: v })?,
            None => defaults.session_ttl,
        };

        let session_key = match lookup("SESSION_KEY") {
            Some(val) if val.len() >= MIN_SESSION_KEY_LEN => Some(val),
            Some(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need {MIN_SESSION_KEY_LEN}+), generating random key",
                    val.len()
                );
                None
            }
            None => None,
        };

        Ok(AppConfig {
            bind_addr: lookup("BIND_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections,
            session_key,
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.max_connections, 8);
        assert_eq!(cfg.session_ttl, Duration::minutes(60));
        assert!(cfg.session_key.is_none());
    }

    #[test]
    fn reads_values() {
        let key = "k".repeat(64);
        let cfg = load(&[
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("DATABASE_URL", "postgres://localhost/fortress"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("SESSION_TTL_MINUTES", "15"),
            ("SESSION_KEY", &key),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/fortress"));
        assert_eq!(cfg.max_connections, 4);
        assert_eq!(cfg.session_ttl, Duration::minutes(15));
        assert_eq!(cfg.session_key.as_deref(), Some(key.as_str()));
    }

    #[test]
    fn short_session_key_is_dropped() {
        let cfg = load(&[("SESSION_KEY", "short")]).unwrap();
        assert!(cfg.session_key.is_none());
    }

    #[test]
    fn invalid_numbers_are_errors() {
        assert!(matches!(
            load(&[("SESSION_TTL_MINUTES", "0")]),
            Err(ConfigError::Invalid { var: "SESSION_TTL_MINUTES", .. })
        ));
        assert!(matches!(
            load(&[("DATABASE_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid { var: "DATABASE_MAX_CONNECTIONS", .. })
        ));
    }
}
