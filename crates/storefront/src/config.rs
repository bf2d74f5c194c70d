//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ECWID_STORE_ID` - Numeric Ecwid store ID
//! - `ECWID_PUBLIC_TOKEN` - Ecwid public access token (`public_...`)
//!
//! ## Optional
//! - `ECWID_API_BASE_URL` - REST API root (default: <https://app.ecwid.com/api/v3>)
//! - `ECWID_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 10)
//! - `SHOP_STORAGE_PATH` - Local storage file (default: `<data dir>/ecwid-shop/storage.json`)
//! - `SHOP_CART_KEY` - Storage slot for the cart (default: `shopping-cart`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::storage::{FileStore, keys};

const DEFAULT_API_BASE_URL: &str = "https://app.ecwid.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Ecwid REST API configuration
    pub ecwid: EcwidConfig,
    /// Local storage file holding the cart and preferences
    pub storage_path: PathBuf,
    /// Storage slot name for the cart
    pub cart_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Ecwid REST API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct EcwidConfig {
    /// Numeric store ID
    pub store_id: String,
    /// Public access token sent as a bearer token
    pub public_token: SecretString,
    /// API root, without the store ID (e.g. <https://app.ecwid.com/api/v3>)
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for EcwidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcwidConfig")
            .field("store_id", &self.store_id)
            .field("public_token", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let ecwid = EcwidConfig::from_env()?;
        let storage_path = get_optional_env("SHOP_STORAGE_PATH")
            .map_or_else(FileStore::default_path, PathBuf::from);
        let cart_key = get_env_or_default("SHOP_CART_KEY", keys::CART);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            ecwid,
            storage_path,
            cart_key,
            sentry_dsn,
        })
    }
}

impl EcwidConfig {
    /// Build a configuration for `store_id` against the public API root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store ID is not numeric.
    pub fn new(store_id: &str, public_token: SecretString) -> Result<Self, ConfigError> {
        Ok(Self {
            store_id: validate_store_id(store_id, "ECWID_STORE_ID")?,
            public_token,
            base_url: parse_base_url(DEFAULT_API_BASE_URL, "ECWID_API_BASE_URL")?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let store_id = validate_store_id(&get_required_env("ECWID_STORE_ID")?, "ECWID_STORE_ID")?;
        let public_token = get_validated_secret("ECWID_PUBLIC_TOKEN")?;
        let base_url = parse_base_url(
            &get_env_or_default("ECWID_API_BASE_URL", DEFAULT_API_BASE_URL),
            "ECWID_API_BASE_URL",
        )?;
        let timeout = get_optional_env("ECWID_TIMEOUT_SECS")
            .map(|raw| parse_timeout(&raw, "ECWID_TIMEOUT_SECS"))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            store_id,
            public_token,
            base_url,
            timeout,
        })
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.public_token.expose_secret())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a request timeout in whole seconds. Zero is rejected.
fn parse_timeout(raw: &str, key: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Store IDs are plain integers; anything else would end up in the URL path.
fn validate_store_id(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("store ID must be numeric (got '{value}')"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse the API root, normalizing away a trailing slash.
fn parse_base_url(value: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a token is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real Ecwid tokens are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the token from the Ecwid control panel."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-public-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("public_aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("public_Q7vzK2mXp9LwR4tYb8NcHs3JdF6gA1eU", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_store_id() {
        assert_eq!(validate_store_id(" 108362264 ", "X").unwrap(), "108362264");
        assert!(validate_store_id("", "X").is_err());
        assert!(validate_store_id("12/../34", "X").is_err());
    }

    #[test]
    fn test_parse_base_url_trims_trailing_slash() {
        let url = parse_base_url("https://app.ecwid.com/api/v3/", "X").unwrap();
        assert_eq!(url.as_str(), "https://app.ecwid.com/api/v3");
        assert!(parse_base_url("not a url", "X").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(
            parse_timeout("30", "ECWID_TIMEOUT_SECS").unwrap(),
            Duration::from_secs(30)
        );
        assert!(matches!(
            parse_timeout("0", "ECWID_TIMEOUT_SECS"),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            parse_timeout("soon", "ECWID_TIMEOUT_SECS"),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = EcwidConfig::new("42", SecretString::from("token")).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.bearer(), "Bearer token");
    }

    #[test]
    fn test_ecwid_config_debug_redacts_token() {
        let config =
            EcwidConfig::new("108362264", SecretString::from("public_super_secret_value")).unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("108362264"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("public_super_secret_value"));
    }
}
