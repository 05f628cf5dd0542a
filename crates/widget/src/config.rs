//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the widget runs out of the box with the
//! embedded demo catalog.
//!
//! - `VOCALSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `VOCALSHOP_PORT` - Listen port (default: 3000)
//! - `VOCALSHOP_CATALOG_URL` - External catalog URL used as the default
//!   catalog instead of the embedded demo one
//! - `VOCALSHOP_FETCH_TIMEOUT_MS` - Fetch proxy / catalog load timeout
//!   (default: 8000)
//! - `VOCALSHOP_FETCH_MAX_BYTES` - Fetch proxy response size cap
//!   (default: 2000000)
//! - `VOCALSHOP_ADD_THRESHOLD` - Add-to-cart confidence threshold
//!   (default: 3)
//! - `VOCALSHOP_PRICE_AROUND_MARGIN` - Half-width for "autour de N"
//!   (default: 10)
//! - `VOCALSHOP_SUGGESTION_PRICE_MARGIN` - Price slack for suggestions
//!   (default: 20)
//! - `VOCALSHOP_SPEECH_IDLE_TIMEOUT_MS` - Listening idle timeout
//!   (default: 8000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::matcher::MatchPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Widget application configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// External catalog used as the default catalog, if configured
    pub catalog_url: Option<String>,
    /// Fetch proxy and catalog load timeout
    pub fetch_timeout: Duration,
    /// Fetch proxy response size cap in bytes
    pub fetch_max_bytes: usize,
    /// Matching thresholds (policy, overridable per deployment)
    pub match_policy: MatchPolicy,
    /// Listening session idle timeout
    pub speech_idle_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("VOCALSHOP_HOST", "127.0.0.1")?;
        let port = parse_env_or("VOCALSHOP_PORT", "3000")?;
        let fetch_timeout_ms: u64 = parse_env_or("VOCALSHOP_FETCH_TIMEOUT_MS", "8000")?;
        let fetch_max_bytes = parse_env_or("VOCALSHOP_FETCH_MAX_BYTES", "2000000")?;
        let speech_idle_ms: u64 = parse_env_or("VOCALSHOP_SPEECH_IDLE_TIMEOUT_MS", "8000")?;

        let defaults = MatchPolicy::default();
        let match_policy = MatchPolicy {
            add_score_threshold: parse_env_or(
                "VOCALSHOP_ADD_THRESHOLD",
                &defaults.add_score_threshold.to_string(),
            )?,
            price_around_margin: parse_env_or(
                "VOCALSHOP_PRICE_AROUND_MARGIN",
                &defaults.price_around_margin.to_string(),
            )?,
            suggestion_price_margin: parse_env_or(
                "VOCALSHOP_SUGGESTION_PRICE_MARGIN",
                &defaults.suggestion_price_margin.to_string(),
            )?,
            ..defaults
        };

        Ok(Self {
            host,
            port,
            catalog_url: get_optional_env("VOCALSHOP_CATALOG_URL"),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            fetch_max_bytes,
            match_policy,
            speech_idle_timeout: Duration::from_millis(speech_idle_ms),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            catalog_url: None,
            fetch_timeout: Duration::from_millis(8000),
            fetch_max_bytes: 2_000_000,
            match_policy: MatchPolicy::default(),
            speech_idle_timeout: Duration::from_millis(8000),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse an environment variable with a default value.
fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
