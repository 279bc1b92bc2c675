//! REST gateway to the store backend.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheaply cloneable (`Arc` inner)
//! - Bearer token attached per request when a session exists
//! - Catalog reads cached in memory via `moka` (5 minute TTL by default)
//! - Cart, address, order and payment calls always hit the network
//!
//! Every call fails with the same [`ApiError`] taxonomy, so callers never
//! see raw transport or status codes.
//!
//! # Example
//!
//! ```rust,ignore
//! use scentbox_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config)?;
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let product = client.get_product(&page.products[0].id).await?;
//! ```

mod addresses;
mod auth;
mod backend;
mod cache;
mod cart;
mod catalog;
mod client;
mod contact;
mod orders;
mod payment;
pub mod types;

pub use backend::{CartSync, CheckoutBackend};
pub use client::{Access, ApiClient, ApiPath};
pub use types::*;

use thiserror::Error;

/// Errors from the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A protected call was attempted without a session.
    #[error("Not signed in")]
    Unauthenticated,

    /// The server rejected the credentials or the session expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session is valid but lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server refused the request on business grounds (400, 409, 422).
    #[error("{0}")]
    BusinessRule(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An id that cannot stand as a single path segment (empty, `.` or `..`).
    #[error("Invalid id in path: {0:?}")]
    InvalidPath(String),
}

impl ApiError {
    /// Whether the failure happened before any response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the failure means the session is missing or no longer valid.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized(_))
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::BusinessRule("Product is out of stock".to_string());
        assert_eq!(err.to_string(), "Product is out of stock");

        let err = ApiError::Status {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad gateway");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_api_error_classification() {
        assert!(ApiError::Unauthenticated.is_auth());
        assert!(ApiError::Unauthorized("expired".to_string()).is_auth());
        assert!(!ApiError::Forbidden("admin only".to_string()).is_auth());
        assert_eq!(ApiError::Unauthenticated.status(), None);
    }
}
