//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_ROOMS_ROUTE: &str = "/rooms";
pub const DEFAULT_STORAGE_PATH: &str = ".roomfeed/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Firebase project endpoints and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub identity_toolkit_url: String,
    pub secure_token_url: String,
}

impl FirebaseConfig {
    /// Config pointing at the public Google endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_owned(),
            secure_token_url: DEFAULT_SECURE_TOKEN_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub firebase: FirebaseConfig,
    pub rooms_route: String,
    pub storage_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `ROOMFEED_FIREBASE_API_KEY`
    ///
    /// Optional:
    /// - `ROOMFEED_API_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `ROOMFEED_IDENTITY_TOOLKIT_URL`, `ROOMFEED_SECURE_TOKEN_URL`: Google endpoints
    /// - `ROOMFEED_ROOMS_ROUTE`: default `/rooms`
    /// - `ROOMFEED_STORAGE_PATH`: default `.roomfeed/storage.json`
    /// - `ROOMFEED_REQUEST_TIMEOUT_SECS`: default 120
    /// - `ROOMFEED_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("ROOMFEED_FIREBASE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing { var: "ROOMFEED_FIREBASE_API_KEY" })?;

        let base = |var: &str, default: &str| trim_base_url(&lookup(var).unwrap_or_else(|| default.to_owned()));

        let rooms_route = lookup("ROOMFEED_ROOMS_ROUTE").unwrap_or_else(|| DEFAULT_ROOMS_ROUTE.to_owned());
        if !rooms_route.starts_with('/') {
            return Err(ConfigError::Invalid { var: "ROOMFEED_ROOMS_ROUTE", value: rooms_route });
        }

        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "ROOMFEED_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "ROOMFEED_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self {
            api_base_url: base("ROOMFEED_API_BASE_URL", DEFAULT_API_BASE_URL),
            firebase: FirebaseConfig {
                api_key,
                identity_toolkit_url: base("ROOMFEED_IDENTITY_TOOLKIT_URL", DEFAULT_IDENTITY_TOOLKIT_URL),
                secure_token_url: base("ROOMFEED_SECURE_TOKEN_URL", DEFAULT_SECURE_TOKEN_URL),
            },
            rooms_route,
            storage_path: lookup("ROOMFEED_STORAGE_PATH").map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
            timeouts,
        })
    }
}

fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ConfigError::Invalid { var, value: raw }),
    }
}
