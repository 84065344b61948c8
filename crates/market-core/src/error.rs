//! # Marketplace Error Types
//!
//! Typed error handling for the vendio marketplace.
//! All fallible operations return `Result<T, MarketError>`.

use thiserror::Error;

/// Core error type for all marketplace operations
#[derive(Debug, Error)]
pub enum MarketError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed request data (bad body, unparsable form)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A submitted field failed validation
    #[error("Validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Requested resource does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// Authenticated, but not authorized for the target resource.
    /// Rendered as 404 so ownership misses never reveal existence.
    #[error("forbidden")]
    Forbidden,

    /// No authenticated identity on the request
    #[error("authentication required")]
    Unauthenticated,

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Shorthand for a NotFound error
    pub fn not_found(what: impl Into<String>) -> Self {
        MarketError::NotFound { what: what.into() }
    }

    /// Shorthand for a field-level validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MarketError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketError::Network(_) | MarketError::Provider { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            MarketError::Configuration(_) => 500,
            MarketError::InvalidRequest(_) => 400,
            MarketError::Validation { .. } => 400,
            MarketError::NotFound { .. } => 404,
            // Collapsed into 404 to avoid existence leaks
            MarketError::Forbidden => 404,
            MarketError::Unauthenticated => 401,
            MarketError::Provider { .. } => 502,
            MarketError::Network(_) => 503,
            MarketError::Serialization(_) => 500,
            MarketError::Internal(_) => 500,
        }
    }
}

/// Result type alias for marketplace operations
pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MarketError::Network("timeout".into()).is_retryable());
        assert!(MarketError::Provider {
            provider: "stripe".into(),
            message: "rate limited".into()
        }
        .is_retryable());
        assert!(!MarketError::validation("slug", "taken").is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(MarketError::validation("price", "negative").status_code(), 400);
        assert_eq!(MarketError::not_found("product").status_code(), 404);
        assert_eq!(MarketError::Unauthenticated.status_code(), 401);
        assert_eq!(
            MarketError::Provider {
                provider: "stripe".into(),
                message: "boom".into()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_forbidden_is_indistinguishable_from_not_found() {
        assert_eq!(
            MarketError::Forbidden.status_code(),
            MarketError::not_found("product").status_code()
        );
    }
}
