//! External payment gateway seam.
//!
//! The store backend creates payment intents; collecting the money happens
//! elsewhere (a hosted card form, a wallet app). [`PaymentGateway`] is the
//! boundary the checkout flow hands an intent across.

use std::future::Future;

use scentbox_core::PaymentIntentId;
use thiserror::Error;

use crate::api::{PaymentConfig, PaymentIntent};

/// Why a payment was not collected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The card issuer or gateway refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The customer abandoned the payment.
    #[error("payment cancelled")]
    Cancelled,

    /// The gateway could not be reached or misbehaved.
    #[error("payment gateway error: {0}")]
    Gateway(String),
}

/// Proof of a collected payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment_intent_id: PaymentIntentId,
    /// Gateway-side reference (charge id), when one exists.
    pub reference: Option<String>,
}

/// Collects payment for an intent.
pub trait PaymentGateway: Send + Sync {
    /// Collect the intent's amount.
    fn collect_payment(
        &self,
        intent: &PaymentIntent,
        config: &PaymentConfig,
    ) -> impl Future<Output = Result<PaymentReceipt, PaymentError>> + Send;
}

/// A payment the customer completed outside this process, identified by
/// the reference the gateway gave them.
#[derive(Debug, Clone)]
pub struct ExternalPaymentReference {
    reference: String,
}

impl ExternalPaymentReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into().trim().to_string(),
        }
    }
}

impl PaymentGateway for ExternalPaymentReference {
    async fn collect_payment(
        &self,
        intent: &PaymentIntent,
        _config: &PaymentConfig,
    ) -> Result<PaymentReceipt, PaymentError> {
        if self.reference.is_empty() {
            return Err(PaymentError::Cancelled);
        }
        tracing::debug!(
            payment_intent_id = %intent.id,
            reference = %self.reference,
            "Using external payment reference"
        );
        Ok(PaymentReceipt {
            payment_intent_id: intent.id.clone(),
            reference: Some(self.reference.clone()),
        })
    }
}
