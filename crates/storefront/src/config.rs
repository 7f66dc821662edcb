//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CANDLEWORKS_API_URL` - Base URL of the backend API
//!
//! ## Optional
//! - `CANDLEWORKS_IDLE_TIMEOUT_SECS` - Idle logout after this many seconds
//!   without user activity (default: 900)
//! - `CANDLEWORKS_SESSION_TIMEOUT_SECS` - Hard logout after this many seconds
//!   of total session lifetime, regardless of activity (default: 14400)
//! - `CANDLEWORKS_UPI_PAYEE_VPA` - UPI virtual payment address for the QR
//!   checkout flow
//! - `CANDLEWORKS_UPI_PAYEE_NAME` - Display name of the UPI payee

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// UPI payee used by the QR checkout flow.
#[derive(Debug, Clone)]
pub struct UpiPayee {
    /// Virtual payment address (e.g., store@upi).
    pub vpa: String,
    /// Display name shown by the payer's UPI app.
    pub name: String,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend API. Always ends with a trailing slash so
    /// relative endpoint paths join cleanly.
    pub api_base_url: Url,
    /// Logout after this long without user activity.
    pub idle_timeout: Duration,
    /// Logout after this long since authentication, regardless of activity.
    pub session_timeout: Duration,
    /// UPI payee for the QR checkout flow, if configured.
    pub upi_payee: Option<UpiPayee>,
}

impl StorefrontConfig {
    /// Default idle timeout: 15 minutes.
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(900);
    /// Default hard session timeout: 4 hours.
    pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(14_400);

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url("CANDLEWORKS_API_URL", &get_required_env("CANDLEWORKS_API_URL")?)?;
        let idle_timeout = get_duration_secs(
            "CANDLEWORKS_IDLE_TIMEOUT_SECS",
            Self::DEFAULT_IDLE_TIMEOUT,
        )?;
        let session_timeout = get_duration_secs(
            "CANDLEWORKS_SESSION_TIMEOUT_SECS",
            Self::DEFAULT_SESSION_TIMEOUT,
        )?;

        let upi_payee = match (
            get_optional_env("CANDLEWORKS_UPI_PAYEE_VPA"),
            get_optional_env("CANDLEWORKS_UPI_PAYEE_NAME"),
        ) {
            (Some(vpa), name) => Some(UpiPayee {
                vpa,
                name: name.unwrap_or_else(|| "Candleworks".to_string()),
            }),
            (None, _) => None,
        };

        Ok(Self {
            api_base_url,
            idle_timeout,
            session_timeout,
            upi_payee,
        })
    }

    /// Build a config programmatically (tests, embedding).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid URL.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", api_base_url)?,
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            session_timeout: Self::DEFAULT_SESSION_TIMEOUT,
            upi_payee: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a duration in whole seconds, falling back to a default.
fn get_duration_secs(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse a base URL, normalizing to a trailing slash so `Url::join` treats it
/// as a directory.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("TEST", "http://localhost:3001").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/");
    }

    #[test]
    fn test_parse_base_url_keeps_slash() {
        let url = parse_base_url("TEST", "http://localhost:3001/api/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST", "not a url").is_err());
    }

    #[test]
    fn test_for_base_url_defaults() {
        let config = StorefrontConfig::for_base_url("http://localhost:3001").unwrap();
        assert_eq!(config.idle_timeout, StorefrontConfig::DEFAULT_IDLE_TIMEOUT);
        assert_eq!(
            config.session_timeout,
            StorefrontConfig::DEFAULT_SESSION_TIMEOUT
        );
        assert!(config.upi_payee.is_none());
    }

    #[test]
    fn test_base_url_joins_relative_paths() {
        let config = StorefrontConfig::for_base_url("http://localhost:3001").unwrap();
        let joined = config.api_base_url.join("cart/query/").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:3001/cart/query/");
    }
}
