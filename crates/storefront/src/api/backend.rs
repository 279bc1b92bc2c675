//! Service traits the cart store and checkout flow depend on.
//!
//! [`ApiClient`] implements both against the REST backend; tests swap in
//! in-memory fakes.

use std::future::Future;

use scentbox_core::{Cart, CartChange, Money, OrderId, PaymentIntentId};

use super::client::ApiClient;
use super::types::{AddressInput, Order, OrderRequest, PaymentConfig, PaymentIntent, SavedAddress};
use super::ApiError;

/// Remote copy of the cart.
pub trait CartSync: Send + Sync {
    /// Whether calls would carry a session.
    fn has_session(&self) -> impl Future<Output = bool> + Send;

    /// Fetch the server cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    /// Send one local change.
    fn push_change(&self, change: &CartChange) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Address, order and payment calls made during checkout.
pub trait CheckoutBackend: Send + Sync {
    fn create_address(
        &self,
        input: &AddressInput,
    ) -> impl Future<Output = Result<SavedAddress, ApiError>> + Send;

    fn create_order(&self, request: &OrderRequest)
    -> impl Future<Output = Result<Order, ApiError>> + Send;

    fn payment_config(&self) -> impl Future<Output = Result<PaymentConfig, ApiError>> + Send;

    fn create_payment_intent(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> impl Future<Output = Result<PaymentIntent, ApiError>> + Send;

    fn confirm_payment(
        &self,
        order_id: &OrderId,
        payment_intent_id: &PaymentIntentId,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// Cancel an order the customer no longer pays for.
    fn cancel_order(&self, order_id: &OrderId)
    -> impl Future<Output = Result<Order, ApiError>> + Send;
}

impl CartSync for ApiClient {
    async fn has_session(&self) -> bool {
        self.has_token().await
    }

    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.get_cart().await
    }

    async fn push_change(&self, change: &CartChange) -> Result<(), ApiError> {
        self.apply_cart_change(change).await
    }
}

impl CheckoutBackend for ApiClient {
    async fn create_address(&self, input: &AddressInput) -> Result<SavedAddress, ApiError> {
        Self::create_address(self, input).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        Self::create_order(self, request).await
    }

    async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        Self::payment_config(self).await
    }

    async fn create_payment_intent(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> Result<PaymentIntent, ApiError> {
        Self::create_payment_intent(self, order_id, amount).await
    }

    async fn confirm_payment(
        &self,
        order_id: &OrderId,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<Order, ApiError> {
        Self::confirm_payment(self, order_id, payment_intent_id).await
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        Self::cancel_order(self, order_id).await
    }
}
