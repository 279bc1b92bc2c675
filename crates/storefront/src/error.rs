//! Unified error handling with Sentry integration.
//!
//! Every library error converts into [`AppError`], which classifies the
//! failure ([`ErrorKind`]) and renders a message safe to show a shopper.
//! Internal failures are captured to Sentry by [`AppError::report`].

use scentbox_core::{AddressError, CartError, TransitionError};
use thiserror::Error;

use crate::api::ApiError;
use crate::cart_store::CartStoreError;
use crate::checkout::{CheckoutError, PaymentError};
use crate::config::ConfigError;
use crate::session::SessionError;

/// Broad failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend or payment gateway could not be reached or failed.
    Network,
    /// Input was rejected before anything was sent.
    Validation,
    /// Missing, expired or insufficient credentials.
    Auth,
    /// The store refused the operation (stock, order state, payment declined).
    BusinessRule,
    /// A bug or local environment problem.
    Internal,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartStoreError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Input rejected locally.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The signed-in user lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        Self::Cart(CartStoreError::Cart(err))
    }
}

impl AppError {
    /// Classify the failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
            Self::Api(err) => api_kind(err),
            Self::Session(err) => session_kind(err),
            Self::Cart(err) => match err {
                CartStoreError::Unauthenticated => ErrorKind::Auth,
                CartStoreError::Cart(CartError::OutOfStock(_)) => ErrorKind::BusinessRule,
                CartStoreError::Cart(_) => ErrorKind::Validation,
                CartStoreError::Storage(_) | CartStoreError::Corrupt(_) => ErrorKind::Internal,
            },
            Self::Checkout(err) => match err {
                CheckoutError::InvalidAddress(_) | CheckoutError::Transition(_) => {
                    ErrorKind::Validation
                }
                CheckoutError::Api(err) => api_kind(err),
                CheckoutError::Payment(PaymentError::Declined(_) | PaymentError::Cancelled) => {
                    ErrorKind::BusinessRule
                }
                CheckoutError::Payment(PaymentError::Gateway(_)) => ErrorKind::Network,
            },
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Auth,
        }
    }

    /// A message safe to show a shopper. Never exposes internal details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err)
            | Self::Session(SessionError::Api(err))
            | Self::Checkout(CheckoutError::Api(err)) => api_message(err),
            Self::Session(err) if session_kind(err) != ErrorKind::Internal => err.to_string(),
            Self::Cart(CartStoreError::Unauthenticated) => "Please sign in to continue.".to_string(),
            Self::Cart(CartStoreError::Cart(err)) => capitalize(&err.to_string()),
            Self::Checkout(CheckoutError::InvalidAddress(errors)) => address_message(errors),
            Self::Checkout(CheckoutError::Transition(TransitionError::AddressRequired)) => {
                "Please add a shipping address first.".to_string()
            }
            Self::Checkout(CheckoutError::Transition(_)) => {
                "That step is not available right now.".to_string()
            }
            Self::Checkout(CheckoutError::Payment(err)) => match err {
                PaymentError::Declined(reason) => format!("Payment declined: {reason}"),
                PaymentError::Cancelled => "Payment was cancelled.".to_string(),
                PaymentError::Gateway(_) => {
                    "The payment service is unavailable. Please try again.".to_string()
                }
            },
            Self::Validation(message) => message.clone(),
            Self::Forbidden(_) => "You do not have permission to do that.".to_string(),
            Self::Config(_) | Self::Internal(_) | Self::Session(_) | Self::Cart(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Log the error and, for internal or server failures, capture it to
    /// Sentry.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, kind = ?self.kind(), "Operation rejected");
        }
    }

    fn is_reportable(&self) -> bool {
        match self.kind() {
            ErrorKind::Internal => true,
            ErrorKind::Network => self.api_error().is_some_and(|e| {
                matches!(e, ApiError::Status { status, .. } if *status >= 500)
            }),
            _ => false,
        }
    }

    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err)
            | Self::Session(SessionError::Api(err))
            | Self::Checkout(CheckoutError::Api(err)) => Some(err),
            _ => None,
        }
    }
}

fn api_kind(err: &ApiError) -> ErrorKind {
    match err {
        ApiError::Network(_) | ApiError::RateLimited(_) => ErrorKind::Network,
        ApiError::Status { status, .. } if *status >= 500 => ErrorKind::Network,
        ApiError::Status { .. } | ApiError::BusinessRule(_) | ApiError::NotFound(_) => {
            ErrorKind::BusinessRule
        }
        ApiError::Unauthenticated | ApiError::Unauthorized(_) | ApiError::Forbidden(_) => {
            ErrorKind::Auth
        }
        ApiError::InvalidPath(_) => ErrorKind::Validation,
        ApiError::Decode(_) | ApiError::InvalidUrl(_) => ErrorKind::Internal,
    }
}

fn session_kind(err: &SessionError) -> ErrorKind {
    match err {
        SessionError::InvalidEmail(_) | SessionError::WeakPassword | SessionError::MissingName => {
            ErrorKind::Validation
        }
        SessionError::Expired | SessionError::NotSignedIn => ErrorKind::Auth,
        SessionError::Storage(_) | SessionError::Corrupt(_) => ErrorKind::Internal,
        SessionError::Api(err) => api_kind(err),
    }
}

fn api_message(err: &ApiError) -> String {
    match err {
        ApiError::Network(_) | ApiError::Status { .. } if api_kind(err) == ErrorKind::Network => {
            "Could not reach the store. Check your connection and try again.".to_string()
        }
        ApiError::RateLimited(seconds) => {
            format!("Too many requests. Please wait {seconds} seconds and try again.")
        }
        ApiError::Unauthenticated => "Please sign in to continue.".to_string(),
        ApiError::Unauthorized(message) if !message.is_empty() => message.clone(),
        ApiError::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
        ApiError::Forbidden(_) => "You do not have permission to do that.".to_string(),
        ApiError::NotFound(_) => "We couldn't find that.".to_string(),
        ApiError::InvalidPath(_) => "That id is not valid.".to_string(),
        ApiError::BusinessRule(message) | ApiError::Status { message, .. } => message.clone(),
        ApiError::Network(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
            "Something went wrong. Please try again.".to_string()
        }
    }
}

fn address_message(errors: &[AddressError]) -> String {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("Please fix the address: {}", details.join("; "))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use scentbox_core::{AddressField, CheckoutStep};

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Validation error: quantity must be a number");

        let err = AppError::Api(ApiError::NotFound("product p9".to_string()));
        assert_eq!(err.to_string(), "API error: Not found: product p9");
    }

    #[test]
    fn test_app_error_kinds() {
        assert_eq!(
            AppError::from(ApiError::Unauthenticated).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            AppError::from(ApiError::BusinessRule("out of stock".to_string())).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            AppError::from(ApiError::Status {
                status: 503,
                message: "down".to_string()
            })
            .kind(),
            ErrorKind::Network
        );
        assert_eq!(
            AppError::from(SessionError::WeakPassword).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AppError::from(CartError::OutOfStock("Oud Noir".to_string())).kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            AppError::from(CheckoutError::Payment(PaymentError::Gateway("timeout".to_string())))
                .kind(),
            ErrorKind::Network
        );
        assert_eq!(
            AppError::Internal("bug".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let err = AppError::Api(ApiError::Decode("expected `,` at line 1".to_string()));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = AppError::Api(ApiError::Status {
            status: 500,
            message: "MongoServerError: E11000".to_string(),
        });
        assert!(!err.user_message().contains("Mongo"));

        let err = AppError::Session(SessionError::Corrupt(
            serde_json::from_str::<u8>("x").unwrap_err(),
        ));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_user_messages_pass_business_rules_through() {
        let err = AppError::Api(ApiError::BusinessRule("Only 2 left in stock".to_string()));
        assert_eq!(err.user_message(), "Only 2 left in stock");

        let err = AppError::from(CartError::OutOfStock("Oud Noir".to_string()));
        assert_eq!(err.user_message(), "Oud Noir is out of stock");

        let err = AppError::Checkout(CheckoutError::InvalidAddress(vec![
            AddressError::InvalidPostalCode,
            AddressError::Required(AddressField::City),
        ]));
        assert!(err.user_message().starts_with("Please fix the address: "));

        let err = AppError::Checkout(CheckoutError::Transition(
            TransitionError::InvalidTransition {
                from: CheckoutStep::Cart,
                event: "retry",
            },
        ));
        assert_eq!(err.user_message(), "That step is not available right now.");
    }
}
