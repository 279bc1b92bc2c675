//! Payment gateway endpoints on the store backend.

use scentbox_core::{Money, OrderId, PaymentIntentId};
use tracing::instrument;

use super::client::{Access, ApiClient};
use super::types::{ConfirmPaymentRequest, Order, PaymentConfig, PaymentIntent, PaymentIntentRequest};
use super::ApiError;

impl ApiClient {
    /// Public gateway settings (publishable key).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        self.get("/payment/config", Access::OptionalAuth).await
    }

    /// Create a payment intent for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id, amount = %amount))]
    pub async fn create_payment_intent(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> Result<PaymentIntent, ApiError> {
        let body = PaymentIntentRequest { order_id, amount };
        self.post("/payment/create-payment-intent", &body, Access::Authenticated)
            .await
    }

    /// Tell the backend the gateway accepted the payment.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BusinessRule` if the backend cannot verify the
    /// payment, or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id, payment_intent_id = %payment_intent_id))]
    pub async fn confirm_payment(
        &self,
        order_id: &OrderId,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<Order, ApiError> {
        let body = ConfirmPaymentRequest {
            order_id,
            payment_intent_id,
        };
        self.post("/payment/confirm-payment", &body, Access::Authenticated)
            .await
    }
}
