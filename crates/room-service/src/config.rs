//! Room service configuration.
//!
//! Configuration is loaded from environment variables. The media
//! backend credential trio is optional at startup: when any part is
//! missing the service starts anyway and reports "not configured" at
//! request time, so the create-code endpoint keeps working in
//! half-provisioned environments. The API secret is a `SecretString`
//! and is redacted in Debug output.

use common::secret::SecretString;
use common::token::DEFAULT_TOKEN_TTL;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Upper bound for the configured join-token TTL (24 hours).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 86_400;

/// Credentials and endpoint for the external media backend.
#[derive(Debug, Clone)]
pub struct MediaBackendConfig {
    /// Client-facing ws(s) URL of the media backend. Also the base the
    /// room API client derives its http(s) endpoint from.
    pub url: String,

    /// API key identifying this deployment to the backend.
    pub api_key: String,

    /// API secret used to sign join credentials. Redacted in Debug.
    pub api_secret: SecretString,
}

/// Room service configuration.
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Media backend credentials, present only when the full trio of
    /// `MEDIA_BACKEND_URL`, `MEDIA_API_KEY`, `MEDIA_API_SECRET` is set.
    pub media: Option<MediaBackendConfig>,

    /// Lifetime of issued join credentials.
    pub token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid token TTL configuration: {0}")]
    InvalidTokenTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable fails validation.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let media = Self::media_from_vars(vars);

        // Parse token TTL with validation
        let token_ttl = if let Some(value_str) = vars.get("TOKEN_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTokenTtl(
                    "TOKEN_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            if value > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must not exceed {} seconds, got {}",
                    MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            Duration::from_secs(value)
        } else {
            DEFAULT_TOKEN_TTL
        };

        Ok(Config {
            bind_address,
            media,
            token_ttl,
        })
    }

    /// Assemble the media backend credential trio.
    ///
    /// All three variables must be present and non-empty; a partial set
    /// is treated as unconfigured with a startup warning naming the
    /// missing pieces.
    fn media_from_vars(vars: &HashMap<String, String>) -> Option<MediaBackendConfig> {
        let url = vars.get("MEDIA_BACKEND_URL").filter(|v| !v.is_empty());
        let api_key = vars.get("MEDIA_API_KEY").filter(|v| !v.is_empty());
        let api_secret = vars.get("MEDIA_API_SECRET").filter(|v| !v.is_empty());

        match (url, api_key, api_secret) {
            (Some(url), Some(api_key), Some(api_secret)) => Some(MediaBackendConfig {
                url: url.clone(),
                api_key: api_key.clone(),
                api_secret: SecretString::from(api_secret.clone()),
            }),
            (None, None, None) => None,
            (url, api_key, api_secret) => {
                let missing: Vec<&str> = [
                    ("MEDIA_BACKEND_URL", url.is_none()),
                    ("MEDIA_API_KEY", api_key.is_none()),
                    ("MEDIA_API_SECRET", api_secret.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect();

                tracing::warn!(
                    target: "rs.config",
                    missing = ?missing,
                    "Partial media backend credentials; running unconfigured"
                );
                None
            }
        }
    }
}
