//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SCENTBOX_API_URL` - Base URL of the store REST API (e.g. `https://api.scentbox.in/api`)
//!
//! ## Optional
//! - `SCENTBOX_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SCENTBOX_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SCENTBOX_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 2000)
//! - `SCENTBOX_FLAT_SHIPPING_FEE` - Shipping charged otherwise (default: 99)
//! - `SCENTBOX_TAX_RATE` - Tax as a fraction (default: 0.18)
//! - `SCENTBOX_SESSION_DIR` - Where the session token and local cart are kept
//!   (default: `$XDG_CONFIG_HOME/scentbox` or `~/.config/scentbox`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use scentbox_core::{Money, PricingConfig};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const APP_DIR_NAME: &str = "scentbox";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the Sentry DSN key.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST API. Always ends with `/`.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Lifetime of cached catalog responses.
    pub cache_ttl: Duration,
    /// Shipping and tax constants for the totals preview.
    pub pricing: PricingConfig,
    /// Directory holding `session.json` and `cart.json`.
    pub session_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("pricing", &self.pricing)
            .field("session_dir", &self.session_dir)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = parse_api_url("SCENTBOX_API_URL", &env.required("SCENTBOX_API_URL")?)?;
        let timeout = Duration::from_secs(env.parsed_or("SCENTBOX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let cache_ttl =
            Duration::from_secs(env.parsed_or("SCENTBOX_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?);
        let pricing = pricing_from_env(&env)?;
        let session_dir = env
            .optional("SCENTBOX_SESSION_DIR")
            .map(PathBuf::from)
            .or_else(|| default_session_dir(&env))
            .ok_or_else(|| ConfigError::MissingEnvVar("SCENTBOX_SESSION_DIR".to_string()))?;

        Ok(Self {
            api_url,
            timeout,
            cache_ttl,
            pricing,
            session_dir,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn for_api_url(api_url: &str, session_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("SCENTBOX_API_URL", api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            pricing: PricingConfig::default(),
            session_dir: session_dir.into(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Path of the persisted session token.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.session_dir.join("session.json")
    }

    /// Path of the persisted local cart.
    #[must_use]
    pub fn cart_file(&self) -> PathBuf {
        self.session_dir.join("cart.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse an optional environment variable, falling back to a default.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    // Url::join drops the last path segment unless the base ends with '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn pricing_from_env<F: Fn(&str) -> Option<String>>(
    env: &Env<'_, F>,
) -> Result<PricingConfig, ConfigError> {
    let defaults = PricingConfig::default();
    let threshold: Decimal = env.parsed_or(
        "SCENTBOX_FREE_SHIPPING_THRESHOLD",
        defaults.free_shipping_threshold.amount(),
    )?;
    let fee: Decimal = env.parsed_or("SCENTBOX_FLAT_SHIPPING_FEE", defaults.flat_shipping_fee.amount())?;
    let tax_rate: Decimal = env.parsed_or("SCENTBOX_TAX_RATE", defaults.tax_rate)?;

    for (key, value) in [
        ("SCENTBOX_FREE_SHIPPING_THRESHOLD", threshold),
        ("SCENTBOX_FLAT_SHIPPING_FEE", fee),
    ] {
        if value.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must not be negative".to_string(),
            ));
        }
    }

    PricingConfig::new(Money::new(threshold), Money::new(fee), tax_rate)
        .map_err(|e| ConfigError::InvalidEnvVar("SCENTBOX_TAX_RATE".to_string(), e.to_string()))
}

fn default_session_dir<F: Fn(&str) -> Option<String>>(env: &Env<'_, F>) -> Option<PathBuf> {
    env.optional("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env.optional("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|base| base.join(APP_DIR_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = config_from(&[("HOME", "/home/test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SCENTBOX_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[
            ("SCENTBOX_API_URL", "http://localhost:5000/api"),
            ("HOME", "/home/test"),
        ])
        .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.session_dir, PathBuf::from("/home/test/.config/scentbox"));
        assert_eq!(
            config.cart_file(),
            PathBuf::from("/home/test/.config/scentbox/cart.json")
        );
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SCENTBOX_API_URL", "https://api.scentbox.in/api/"),
            ("SCENTBOX_TIMEOUT_SECS", "5"),
            ("SCENTBOX_FREE_SHIPPING_THRESHOLD", "1500"),
            ("SCENTBOX_FLAT_SHIPPING_FEE", "49.50"),
            ("SCENTBOX_TAX_RATE", "0.12"),
            ("SCENTBOX_SESSION_DIR", "/tmp/sb"),
            ("XDG_CONFIG_HOME", "/ignored"),
        ])
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_major(1500));
        assert_eq!(config.pricing.flat_shipping_fee, Money::from_minor(4950));
        assert_eq!(config.pricing.tax_rate, Decimal::new(12, 2));
        assert_eq!(config.session_dir, PathBuf::from("/tmp/sb"));
    }

    #[test]
    fn test_xdg_config_home_preferred_over_home() {
        let config = config_from(&[
            ("SCENTBOX_API_URL", "http://localhost:5000/api"),
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/test"),
        ])
        .unwrap();
        assert_eq!(config.session_dir, PathBuf::from("/xdg/scentbox"));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("SCENTBOX_API_URL", "http://localhost:5000/api"), ("HOME", "/h")];

        let mut bad_timeout = base.to_vec();
        bad_timeout.push(("SCENTBOX_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            config_from(&bad_timeout).unwrap_err(),
            ConfigError::InvalidEnvVar(..)
        ));

        let mut bad_tax = base.to_vec();
        bad_tax.push(("SCENTBOX_TAX_RATE", "18"));
        assert!(matches!(
            config_from(&bad_tax).unwrap_err(),
            ConfigError::InvalidEnvVar(ref key, _) if key == "SCENTBOX_TAX_RATE"
        ));

        let mut negative_fee = base.to_vec();
        negative_fee.push(("SCENTBOX_FLAT_SHIPPING_FEE", "-1"));
        assert!(config_from(&negative_fee).is_err());

        assert!(config_from(&[("SCENTBOX_API_URL", "ftp://example.com"), ("HOME", "/h")]).is_err());
        assert!(config_from(&[("SCENTBOX_API_URL", "not a url"), ("HOME", "/h")]).is_err());
    }

    #[test]
    fn test_debug_redacts_sentry_dsn() {
        let config = config_from(&[
            ("SCENTBOX_API_URL", "http://localhost:5000/api"),
            ("HOME", "/h"),
            ("SENTRY_DSN", "https://publickey@o0.ingest.sentry.io/1"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:5000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("publickey"));
    }
}
