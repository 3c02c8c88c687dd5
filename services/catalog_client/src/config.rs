//! services/catalog_client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables. The `.env`
//! file is used for local development.

use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which resource client implementation gets wired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    #[default]
    Live,
    Mock,
}

impl FromStr for CatalogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(CatalogMode::Live),
            "mock" => Ok(CatalogMode::Mock),
            other => Err(format!("'{}' is not one of: live, mock", other)),
        }
    }
}

/// What happens to the local user when the remote sign-out fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutPolicy {
    /// Keep the user in place; only a successful sign-out clears it.
    #[default]
    KeepOnFailure,
    /// Clear the user whether or not the remote sign-out succeeded.
    AlwaysClear,
}

impl FromStr for LogoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep-on-failure" => Ok(LogoutPolicy::KeepOnFailure),
            "always-clear" => Ok(LogoutPolicy::AlwaysClear),
            other => Err(format!(
                "'{}' is not one of: keep-on-failure, always-clear",
                other
            )),
        }
    }
}

/// Holds all configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: CatalogMode,
    /// Only required in live mode.
    pub api_base_url: Option<String>,
    pub logout_policy: LogoutPolicy,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("CATALOG_MODE") {
            Some(raw) => raw
                .parse::<CatalogMode>()
                .map_err(|e| ConfigError::InvalidValue("CATALOG_MODE".to_string(), e))?,
            None => CatalogMode::default(),
        };

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        if mode == CatalogMode::Live && api_base_url.is_none() {
            return Err(ConfigError::MissingVar("API_BASE_URL".to_string()));
        }

        let logout_policy = match lookup("LOGOUT_POLICY") {
            Some(raw) => raw
                .parse::<LogoutPolicy>()
                .map_err(|e| ConfigError::InvalidValue("LOGOUT_POLICY".to_string(), e))?,
            None => LogoutPolicy::default(),
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            mode,
            api_base_url,
            logout_policy,
            log_level,
        })
    }

    /// A configuration for the fully in-memory mock mode.
    pub fn mock() -> Self {
        Self {
            mode: CatalogMode::Mock,
            api_base_url: None,
            logout_policy: LogoutPolicy::default(),
            log_level: Level::INFO,
        }
    }

    /// A live-mode configuration pointing at `api_base_url`.
    pub fn live(api_base_url: impl Into<String>) -> Self {
        let url: String = api_base_url.into();
        Self {
            mode: CatalogMode::Live,
            api_base_url: Some(url.trim_end_matches('/').to_string()),
            logout_policy: LogoutPolicy::default(),
            log_level: Level::INFO,
        }
    }

    pub fn with_logout_policy(mut self, policy: LogoutPolicy) -> Self {
        self.logout_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_live_mode_requires_base_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "API_BASE_URL"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config =
            Config::from_lookup(lookup_from(&[("API_BASE_URL", "https://api.example.com/")]))
                .unwrap();
        assert_eq!(config.mode, CatalogMode::Live);
        assert_eq!(config.api_base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.logout_policy, LogoutPolicy::KeepOnFailure);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_mock_mode_needs_no_base_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("CATALOG_MODE", "Mock"),
            ("LOGOUT_POLICY", "always-clear"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.mode, CatalogMode::Mock);
        assert_eq!(config.api_base_url, None);
        assert_eq!(config.logout_policy, LogoutPolicy::AlwaysClear);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("CATALOG_MODE", "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "CATALOG_MODE"));

        let err = Config::from_lookup(lookup_from(&[
            ("CATALOG_MODE", "mock"),
            ("RUST_LOG", "chatty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RUST_LOG"));
    }
}
