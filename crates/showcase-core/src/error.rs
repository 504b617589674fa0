//! Catalog error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::ids::ProductId;

/// Message shown when neither the server nor the transport supplied one.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Normalized error for every catalog read.
///
/// This is the only error type that crosses the client, cache and view
/// layers. It is `Clone` so one coalesced in-flight failure can be handed to
/// every subscriber of a cache key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Network failure or non-2xx response.
    #[error("{message}")]
    Transport {
        /// Human-readable message, already normalized.
        message: String,
        /// HTTP status when a response was received.
        status: Option<u16>,
    },

    /// The request exceeded the transport timeout.
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// A single-product lookup named an id the catalog does not have.
    #[error("Product with id '{0}' not found")]
    NotFound(ProductId),

    /// The response body did not match the expected shape.
    #[error("Unexpected response from catalog: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Whether a retry may succeed.
    ///
    /// Connection failures, timeouts, 5xx, 408 and 429 are transient.
    /// Missing products and malformed payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } | Self::Timeout(_) => true,
            Self::Transport {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 408 || *status == 429,
            Self::NotFound(_) | Self::Decode(_) => false,
        }
    }

    /// HTTP status of the failed response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Result alias for catalog reads.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CatalogError::transport("connection refused", None).is_transient());
        assert!(CatalogError::transport("bad gateway", Some(502)).is_transient());
        assert!(CatalogError::transport("slow down", Some(429)).is_transient());
        assert!(CatalogError::Timeout(Duration::from_secs(10)).is_transient());
        assert!(!CatalogError::transport("bad request", Some(400)).is_transient());
        assert!(!CatalogError::NotFound(ProductId::new(9999)).is_transient());
        assert!(!CatalogError::Decode("missing field".into()).is_transient());
    }

    #[test]
    fn test_display_uses_normalized_message() {
        let err = CatalogError::transport("Product with id '0' not found", Some(404));
        assert_eq!(err.to_string(), "Product with id '0' not found");
        assert_eq!(
            CatalogError::Timeout(Duration::from_secs(10)).to_string(),
            "Request timed out after 10s"
        );
        assert_eq!(CatalogError::NotFound(ProductId::new(3)).status(), Some(404));
    }
}
