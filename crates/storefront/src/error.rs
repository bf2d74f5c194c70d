//! Unified error handling.
//!
//! Provides a unified `AppError` type for the operations that can fail
//! outright: loading configuration and talking to the catalog. Cart and locale
//! persistence never fail from the caller's point of view and so have no
//! variant here.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::locale::UnknownLocale;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ecwid API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Unsupported locale requested.
    #[error("Locale error: {0}")]
    Locale(#[from] UnknownLocale),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error points at a fault outside the user's control and
    /// should be reported to error tracking.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Locale(_) | Self::BadRequest(_) => false,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Catalog(CatalogError::NotFound("product-123".to_string()));
        assert_eq!(err.to_string(), "Catalog error: Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_server_fault_classification() {
        assert!(AppError::Catalog(CatalogError::RateLimited(1)).is_server_fault());
        assert!(!AppError::Catalog(CatalogError::NotFound("x".to_string())).is_server_fault());
        assert!(!AppError::BadRequest("x".to_string()).is_server_fault());
        assert!(
            AppError::Config(ConfigError::MissingEnvVar("ECWID_STORE_ID".to_string()))
                .is_server_fault()
        );
    }
}
